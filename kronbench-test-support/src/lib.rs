//! Shared test utilities used across kronbench crates.

pub mod graphs {
    //! Small hand-built graphs with known breadth-first structure.
    //!
    //! Fixtures are plain `(v0, v1)` pairs so this crate stays independent of
    //! the core types.

    /// Vertex count of [`path_with_branch`].
    pub const PATH_WITH_BRANCH_VERTICES: u64 = 8;

    /// Edges of [`path_with_branch`] with both endpoints reached from root 0.
    pub const PATH_WITH_BRANCH_TRAVERSED: u64 = 5;

    /// A path `0-1-2-3` with a branch `1-4`, a self-loop on 5, and the
    /// isolated pair `6-7`.
    ///
    /// From root 0 the reached set is `{0, 1, 2, 3, 4}`, and five edges have
    /// both endpoints reached, counting the duplicate `2-1`.
    #[must_use]
    pub fn path_with_branch() -> Vec<(u64, u64)> {
        vec![(0, 1), (1, 2), (2, 3), (1, 4), (5, 5), (6, 7), (2, 1)]
    }

    /// Parents of the breadth-first tree of [`path_with_branch`] from root 0.
    #[must_use]
    pub fn path_with_branch_tree() -> Vec<Option<u64>> {
        vec![
            Some(0),
            Some(0),
            Some(1),
            Some(2),
            Some(1),
            None,
            None,
            None,
        ]
    }

    /// A cycle over `vertices` vertices.
    #[must_use]
    pub fn ring(vertices: u64) -> Vec<(u64, u64)> {
        (0..vertices).map(|v| (v, (v + 1) % vertices)).collect()
    }

    /// Every vertex joined to vertex 0.
    #[must_use]
    pub fn star(vertices: u64) -> Vec<(u64, u64)> {
        (1..vertices).map(|v| (0, v)).collect()
    }
}

pub mod tracing {
    //! A layer that captures closed spans and events for later assertions.
    use std::collections::HashMap;
    use std::fmt;
    use std::sync::{Arc, Mutex, PoisonError};

    use tracing::field::{Field, Visit};
    use tracing::span::{Attributes, Id, Record};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::Context;
    use tracing_subscriber::registry::LookupSpan;

    /// Closed span with its recorded fields.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SpanRecord {
        /// Span name from the metadata.
        pub name: String,
        /// Field values rendered as strings.
        pub fields: HashMap<String, String>,
    }

    /// Emitted event with its level, target and fields.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct EventRecord {
        /// Event level.
        pub level: Level,
        /// Event target.
        pub target: String,
        /// Field values rendered as strings; the text is under `message`.
        pub fields: HashMap<String, String>,
    }

    impl EventRecord {
        /// The event's message, if any.
        #[must_use]
        pub fn message(&self) -> Option<&str> {
            self.fields.get("message").map(String::as_str)
        }
    }

    #[derive(Default)]
    struct Captured {
        spans: Vec<SpanRecord>,
        events: Vec<EventRecord>,
    }

    /// Cloneable handle to a capturing layer; clones share one buffer.
    ///
    /// # Examples
    /// ```
    /// use kronbench_test_support::tracing::RecordingLayer;
    /// use tracing_subscriber::layer::SubscriberExt;
    ///
    /// let layer = RecordingLayer::default();
    /// let subscriber = tracing_subscriber::registry().with(layer.clone());
    /// tracing::subscriber::with_default(subscriber, || {
    ///     tracing::info_span!("stage").in_scope(|| tracing::warn!("careful"));
    /// });
    /// assert!(layer.span("stage").is_some());
    /// assert!(layer.has_event(tracing::Level::WARN, "careful"));
    /// ```
    #[derive(Clone, Default)]
    pub struct RecordingLayer {
        captured: Arc<Mutex<Captured>>,
    }

    impl RecordingLayer {
        /// Closed spans in completion order.
        #[must_use]
        pub fn spans(&self) -> Vec<SpanRecord> {
            self.with_captured(|captured| captured.spans.clone())
        }

        /// Events in emission order.
        #[must_use]
        pub fn events(&self) -> Vec<EventRecord> {
            self.with_captured(|captured| captured.events.clone())
        }

        /// First closed span called `name`.
        #[must_use]
        pub fn span(&self, name: &str) -> Option<SpanRecord> {
            self.with_captured(|captured| {
                captured.spans.iter().find(|span| span.name == name).cloned()
            })
        }

        /// Returns whether an event at `level` carried exactly `message`.
        #[must_use]
        pub fn has_event(&self, level: Level, message: &str) -> bool {
            self.with_captured(|captured| {
                captured
                    .events
                    .iter()
                    .any(|event| event.level == level && event.message() == Some(message))
            })
        }

        fn with_captured<T>(&self, read: impl FnOnce(&mut Captured) -> T) -> T {
            let mut guard = self
                .captured
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            read(&mut guard)
        }
    }

    struct OpenSpan(SpanRecord);

    impl<S> Layer<S> for RecordingLayer
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            let mut fields = HashMap::new();
            attrs.record(&mut Fields(&mut fields));
            span.extensions_mut().insert(OpenSpan(SpanRecord {
                name: attrs.metadata().name().to_owned(),
                fields,
            }));
        }

        fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
            if let Some(span) = ctx.span(id) {
                if let Some(open) = span.extensions_mut().get_mut::<OpenSpan>() {
                    values.record(&mut Fields(&mut open.0.fields));
                }
            }
        }

        fn on_close(&self, id: Id, ctx: Context<'_, S>) {
            let closed = ctx
                .span(&id)
                .and_then(|span| span.extensions_mut().remove::<OpenSpan>());
            if let Some(OpenSpan(record)) = closed {
                self.with_captured(|captured| captured.spans.push(record));
            }
        }

        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = HashMap::new();
            event.record(&mut Fields(&mut fields));
            let record = EventRecord {
                level: *event.metadata().level(),
                target: event.metadata().target().to_owned(),
                fields,
            };
            self.with_captured(|captured| captured.events.push(record));
        }
    }

    struct Fields<'a>(&'a mut HashMap<String, String>);

    impl Fields<'_> {
        fn put(&mut self, field: &Field, value: String) {
            self.0.insert(field.name().to_owned(), value);
        }
    }

    impl Visit for Fields<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.put(field, format!("{value:?}"));
        }

        fn record_str(&mut self, field: &Field, value: &str) {
            self.put(field, value.to_owned());
        }

        fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
            self.put(field, value.to_string());
        }

        fn record_bool(&mut self, field: &Field, value: bool) {
            self.put(field, value.to_string());
        }

        fn record_i64(&mut self, field: &Field, value: i64) {
            self.put(field, value.to_string());
        }

        fn record_u64(&mut self, field: &Field, value: u64) {
            self.put(field, value.to_string());
        }

        fn record_f64(&mut self, field: &Field, value: f64) {
            self.put(field, value.to_string());
        }
    }
}

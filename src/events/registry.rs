//! Event Registry
//!
//! Contains:
//! - `EventHandler` trait - for implementing subscribers
//! - `EventMatcher` - filters events by URL pattern
//! - `EventRegistry` - stores and dispatches to handlers

use std::collections::HashMap;

use regex::Regex;

use super::types::{EventKind, ShellEvent};

/// Trait for event subscribers
///
/// Handlers observe events; they cannot change how the shell answers the
/// engine. Everything runs on the GUI thread, so handlers need not be `Send`.
pub trait EventHandler {
    fn handle(&self, event: &ShellEvent);
}

/// Implement EventHandler for closures
impl<F> EventHandler for F
where
    F: Fn(&ShellEvent),
{
    fn handle(&self, event: &ShellEvent) {
        (self)(event)
    }
}

/// Matches events by URL pattern and runs a handler
pub struct EventMatcher {
    /// Regex matched against the event URL (None = match all)
    pattern: Option<Regex>,

    handler: Box<dyn EventHandler>,
}

impl EventMatcher {
    /// Create a matcher that matches every event
    pub fn new<H: EventHandler + 'static>(handler: H) -> Self {
        Self {
            pattern: None,
            handler: Box::new(handler),
        }
    }

    /// Create a matcher with a URL regex
    ///
    /// Events without a URL never match a pattern.
    pub fn with_pattern<H: EventHandler + 'static>(
        pattern: &str,
        handler: H,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Some(Regex::new(pattern)?),
            handler: Box::new(handler),
        })
    }

    /// Check if this matcher applies to an event
    pub fn matches(&self, event: &ShellEvent) -> bool {
        match &self.pattern {
            Some(regex) => event.url().is_some_and(|url| regex.is_match(url.as_str())),
            None => true,
        }
    }
}

impl std::fmt::Debug for EventMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventMatcher")
            .field("pattern", &self.pattern.as_ref().map(|r| r.as_str()))
            .finish()
    }
}

/// Subscription table for shell events
///
/// # Example
///
/// ```ignore
/// let mut events = EventRegistry::new();
///
/// events.on_event(EventKind::TitleChanged, |event: &ShellEvent| {
///     if let ShellEvent::TitleChanged { title } = event {
///         tray.set_tooltip(title);
///     }
/// });
///
/// events.on_event_matching(EventKind::Notification, r"^https://chat\.", |event: &ShellEvent| {
///     notifier.show(event);
/// })?;
/// ```
#[derive(Default)]
pub struct EventRegistry {
    handlers: HashMap<EventKind, Vec<EventMatcher>>,
}

impl EventRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every event of a kind
    pub fn on_event<H: EventHandler + 'static>(&mut self, kind: EventKind, handler: H) -> &mut Self {
        self.handlers
            .entry(kind)
            .or_default()
            .push(EventMatcher::new(handler));
        self
    }

    /// Subscribe to events of a kind whose URL matches `pattern`
    pub fn on_event_matching<H: EventHandler + 'static>(
        &mut self,
        kind: EventKind,
        pattern: &str,
        handler: H,
    ) -> Result<&mut Self, regex::Error> {
        self.handlers
            .entry(kind)
            .or_default()
            .push(EventMatcher::with_pattern(pattern, handler)?);
        Ok(self)
    }

    /// Check if there are any handlers for a kind
    pub fn has_handlers(&self, kind: EventKind) -> bool {
        self.handler_count(kind) > 0
    }

    /// Get the number of handlers for a kind
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map(|v| v.len()).unwrap_or(0)
    }

    /// Remove every handler
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Deliver an event to all matching handlers, in registration order
    ///
    /// Returns how many handlers ran.
    pub fn dispatch(&self, event: &ShellEvent) -> usize {
        let Some(matchers) = self.handlers.get(&event.kind()) else {
            return 0;
        };

        let mut ran = 0;
        for matcher in matchers.iter().filter(|m| m.matches(event)) {
            matcher.handler.handle(event);
            ran += 1;
        }

        tracing::trace!("[EventRegistry] {} delivered to {} handler(s)", event.kind(), ran);
        ran
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (kind, matchers) in &self.handlers {
            map.entry(kind, &matchers.len());
        }
        map.finish()
    }
}

//! Events emitted by the harness and the listeners receiving them.

use std::any::Any;

use rustc_hash::FxHashMap;

/// Events that are emitted by the harness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HarnessEvents<'a> {
    /// A run over the pending candidates starts.
    RunStart {
        /// Number of candidates that will be measured.
        pending: usize,
    },
    /// The measurement of a function starts. This is emitted once per function, not per
    /// iteration. The baseline is measured during construction.
    MeasureStart {
        /// The id of the baseline or candidate.
        id: &'a str,
        /// Number of calls in the measurement.
        iterations: usize,
    },
    /// The measurement of a function finished.
    MeasureStop {
        /// The id of the baseline or candidate.
        id: &'a str,
        /// Average runtime of one call in nanoseconds.
        average_ns: f64,
    },
    /// Measuring `id` failed. The run is aborted, no record changed and the candidates
    /// stay pending. Ends a run in place of [HarnessEvents::RunStop].
    RunFailed {
        /// The id of the candidate that failed.
        id: &'a str,
    },
    /// A run finished and all records were committed.
    RunStop {
        /// Number of candidates measured.
        measured: usize,
    },
}

/// A plugin listening to [HarnessEvents].
pub trait EventListener: Any {
    /// The name of the listener, unique per [EventManager].
    fn name(&self) -> &'static str;
    /// Called for every event, in the order listeners were added.
    fn on_event(&mut self, event: HarnessEvents);
    /// Used to downcast to the concrete listener.
    fn as_any(&mut self) -> &mut dyn Any;
}

/// The event manager is responsible for managing event listeners and emitting events.
/// It is used to notify listeners about events that occur during a measurement.
#[derive(Default)]
pub struct EventManager {
    listeners: Vec<(String, Box<dyn EventListener>)>,
}

impl EventManager {
    /// Creates an event manager without listeners.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Add a new listener to the event manager if it is not already present by name.
    pub fn add_listener_if_absent<L: EventListener + 'static>(&mut self, listener: L) {
        if self.get_listener(listener.name()).is_some() {
            return;
        }
        self.listeners
            .push((listener.name().to_owned(), Box::new(listener)));
    }

    /// Get a listener by name.
    pub fn get_listener(&mut self, name: &str) -> Option<&mut Box<dyn EventListener>> {
        self.listeners
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, l)| l)
    }

    /// Get a listener by name, downcast to its concrete type.
    pub fn downcast_listener<T: 'static>(&mut self, name: &str) -> Option<&mut T> {
        self.get_listener(name)?.as_any().downcast_mut::<T>()
    }

    /// Remove a listener by name.
    pub fn remove_listener_by_name(&mut self, name: &str) {
        self.listeners.retain(|(n, _)| n != name);
    }

    /// Names of all listeners, in the order they are notified.
    pub fn listener_names(&self) -> impl Iterator<Item = &str> {
        self.listeners.iter().map(|(name, _)| name.as_str())
    }

    /// Notify all listeners.
    pub fn emit(&mut self, event: HarnessEvents) {
        for (_, listener) in self.listeners.iter_mut() {
            listener.on_event(event);
        }
    }
}

/// Helper struct to store data per baseline or candidate id.
pub struct PerCandidateData<T> {
    per_id: FxHashMap<String, T>,
}
impl<T> Default for PerCandidateData<T> {
    fn default() -> Self {
        Self::new()
    }
}
impl<T> PerCandidateData<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            per_id: FxHashMap::default(),
        }
    }
    /// The data of `id`.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.per_id.get_mut(id)
    }
    /// The data of `id`.
    pub fn get(&self, id: &str) -> Option<&T> {
        self.per_id.get(id)
    }
    /// Removes the data of `id`.
    pub fn remove(&mut self, id: &str) -> Option<T> {
        self.per_id.remove(id)
    }
    /// Inserts the data of `id`, created by `data`, unless present.
    pub fn insert_if_absent<F: FnOnce() -> T>(&mut self, id: &str, data: F) -> &mut T {
        self.per_id.entry(id.to_string()).or_insert_with(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<String>,
    }

    impl EventListener for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }
        fn on_event(&mut self, event: HarnessEvents) {
            self.seen.push(format!("{:?}", event));
        }
        fn as_any(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn listeners_are_unique_by_name() {
        let mut events = EventManager::new();
        events.add_listener_if_absent(Recorder::default());
        events.add_listener_if_absent(Recorder::default());
        assert_eq!(events.listener_names().count(), 1);

        events.emit(HarnessEvents::RunStart { pending: 2 });
        let recorder = events.downcast_listener::<Recorder>("recorder").unwrap();
        assert_eq!(recorder.seen, vec!["RunStart { pending: 2 }".to_string()]);

        events.remove_listener_by_name("recorder");
        assert!(events.get_listener("recorder").is_none());
    }

    #[test]
    fn per_candidate_data() {
        let mut data = PerCandidateData::new();
        data.insert_if_absent("quick", || 1);
        *data.insert_if_absent("quick", || 5) += 1;
        assert_eq!(data.get("quick"), Some(&2));
        assert_eq!(data.get("slow"), None);
        assert_eq!(data.remove("quick"), Some(2));
        assert_eq!(data.get("quick"), None);
    }
}

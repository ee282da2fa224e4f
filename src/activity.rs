#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Busy,
    Idle,
}

type Observer = Box<dyn FnMut(Activity)>;

#[derive(Default)]
pub struct ActivityCounter {
    in_flight: usize,
    observers: Vec<Observer>,
}

impl ActivityCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(Activity) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn start(&mut self) -> Option<Activity> {
        self.in_flight = self.in_flight.saturating_add(1);
        if self.in_flight == 1 {
            self.notify(Activity::Busy);
            return Some(Activity::Busy);
        }
        None
    }

    pub fn end(&mut self) -> Option<Activity> {
        match self.in_flight {
            0 => None,
            1 => {
                self.in_flight = 0;
                self.notify(Activity::Idle);
                Some(Activity::Idle)
            }
            _ => {
                self.in_flight -= 1;
                None
            }
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    fn notify(&mut self, activity: Activity) {
        for observer in &mut self.observers {
            observer(activity);
        }
    }
}

impl std::fmt::Debug for ActivityCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityCounter")
            .field("in_flight", &self.in_flight)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorded() -> (ActivityCounter, Rc<RefCell<Vec<Activity>>>) {
        let signals = Rc::new(RefCell::new(Vec::new()));
        let mut counter = ActivityCounter::new();
        let sink = signals.clone();
        counter.subscribe(move |activity| sink.borrow_mut().push(activity));
        (counter, signals)
    }

    #[test]
    fn three_overlapping_commands_go_idle_once_after_the_last_completion() {
        let (mut counter, signals) = recorded();
        counter.start();
        counter.start();
        counter.start();
        counter.end();
        counter.end();
        assert!(counter.is_busy());
        assert_eq!(*signals.borrow(), vec![Activity::Busy]);

        assert_eq!(counter.end(), Some(Activity::Idle));
        assert!(!counter.is_busy());
        assert_eq!(*signals.borrow(), vec![Activity::Busy, Activity::Idle]);
    }

    #[test]
    fn unmatched_end_is_absorbed_without_signal() {
        let (mut counter, signals) = recorded();
        assert_eq!(counter.end(), None);
        assert_eq!(counter.in_flight(), 0);
        assert!(signals.borrow().is_empty());

        counter.start();
        counter.end();
        counter.end();
        counter.end();
        assert_eq!(counter.in_flight(), 0);
        assert_eq!(*signals.borrow(), vec![Activity::Busy, Activity::Idle]);
    }

    #[test]
    fn interleavings_converge_to_net_outstanding_operations() {
        // Each pattern lists starts (true) and ends (false); ends never run
        // ahead of their starts, surplus ends trail at the tail.
        let patterns: [&[bool]; 5] = [
            &[true, false, true, true, false],
            &[true, true, true, false, false, false, false, false],
            &[true, false, true, false, true, false],
            &[true, true, false, true, false, false, true],
            &[true, true, true, true, false],
        ];

        for pattern in patterns {
            let (mut counter, signals) = recorded();
            let starts = pattern.iter().filter(|s| **s).count();
            let ends = pattern.len() - starts;
            let mut idle_transitions = 0;
            let mut previous = 0;
            for is_start in pattern {
                if *is_start {
                    counter.start();
                } else {
                    counter.end();
                }
                if previous > 0 && counter.in_flight() == 0 {
                    idle_transitions += 1;
                }
                previous = counter.in_flight();
            }

            assert_eq!(counter.in_flight(), starts.saturating_sub(ends));
            let idles = signals
                .borrow()
                .iter()
                .filter(|a| **a == Activity::Idle)
                .count();
            assert_eq!(idles, idle_transitions);
        }
    }

    #[test]
    fn busy_is_signalled_only_on_the_first_start() {
        let (mut counter, signals) = recorded();
        assert_eq!(counter.start(), Some(Activity::Busy));
        assert_eq!(counter.start(), None);
        assert_eq!(*signals.borrow(), vec![Activity::Busy]);
    }
}

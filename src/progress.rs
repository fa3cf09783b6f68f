//! Map plotting progress notification.

/// Receives progress updates while a map is plotted.
pub trait ProgressObserver {
    /// `plot_count` of `map_size` cells are done. Successive calls see a
    /// non-decreasing `plot_count`, not necessarily one cell apart.
    fn notify(&mut self, map_size: usize, plot_count: usize);

    /// Called before a new map starts.
    fn reset(&mut self) {}
}

/// Observer list plus the running count of plotted cells.
///
/// Not thread-safe; a notifier belongs to the thread that plots the map.
#[derive(Default)]
pub struct ProgressNotifier {
    observers: Vec<Box<dyn ProgressObserver>>,
    plot_count: usize,
}

impl ProgressNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn ProgressObserver>) {
        self.observers.push(observer);
    }

    pub fn plot_count(&self) -> usize {
        self.plot_count
    }

    /// Record `plotted` more cells and tell every observer.
    pub fn notify_plotted(&mut self, map_size: usize, plotted: usize) {
        self.plot_count += plotted;
        for observer in self.observers.iter_mut() {
            observer.notify(map_size, self.plot_count);
        }
    }

    /// Zero the counter and reset every observer.
    pub fn reset(&mut self) {
        self.plot_count = 0;
        for observer in self.observers.iter_mut() {
            observer.reset();
        }
    }
}

impl std::fmt::Debug for ProgressNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressNotifier")
            .field("observers", &self.observers.len())
            .field("plot_count", &self.plot_count)
            .finish()
    }
}

/// Logs percentage milestones through `tracing`.
#[derive(Debug, Default)]
pub struct LogProgress {
    last_percent: usize,
}

impl ProgressObserver for LogProgress {
    fn notify(&mut self, map_size: usize, plot_count: usize) {
        if map_size == 0 {
            return;
        }
        let percent = plot_count * 100 / map_size;
        if percent >= self.last_percent + 10 || (percent == 100 && self.last_percent < 100) {
            self.last_percent = percent;
            tracing::info!("{percent}% of map plotted");
        }
    }

    fn reset(&mut self) {
        self.last_percent = 0;
    }
}

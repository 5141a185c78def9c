use tokio::sync::watch;

/// A single observable value a UI layer can read, subscribe to and write.
#[derive(Debug)]
pub struct Store<T> {
    sender: watch::Sender<T>,
}

impl<T: Clone> Store<T> {
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }

    /// Replaces the value and notifies every subscriber, even when nobody is listening yet.
    pub fn set(&self, value: T) {
        self.sender.send_replace(value);
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }
}

impl<T: Clone + Default> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

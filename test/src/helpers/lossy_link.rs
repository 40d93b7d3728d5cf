/// A deterministic stand-in for a bad connection: drops every n-th message
/// and can deliver each batch in reverse order.
#[derive(Clone, Debug, Default)]
pub struct LossyLink {
    drop_every: Option<usize>,
    reverse: bool,
    sent: usize,
    dropped: usize,
}

impl LossyLink {
    pub fn perfect() -> Self {
        Self::default()
    }

    /// Drops messages n, 2n, 3n, ... counted across the life of the link
    pub fn dropping_every(n: usize) -> Self {
        Self {
            drop_every: Some(n.max(1)),
            ..Self::default()
        }
    }

    pub fn reversing(mut self) -> Self {
        self.reverse = true;
        self
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn transmit(&mut self, batch: Vec<Vec<u8>>) -> Vec<Vec<u8>> {
        let mut delivered = Vec::with_capacity(batch.len());
        for message in batch {
            self.sent += 1;
            if matches!(self.drop_every, Some(n) if self.sent % n == 0) {
                self.dropped += 1;
                continue;
            }
            delivered.push(message);
        }
        if self.reverse {
            delivered.reverse();
        }
        delivered
    }
}

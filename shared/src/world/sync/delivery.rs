use crate::world::authority::actor::RecipientSet;

/// The outbound half of the transport. Implementations queue or send; they
/// must not block the tick loop.
pub trait DeliverySink {
    fn deliver(&mut self, recipients: &RecipientSet, payload: Vec<u8>);
}

/// Collects every outbound message, in delivery order
pub type Outbox = Vec<(RecipientSet, Vec<u8>)>;

impl DeliverySink for Outbox {
    fn deliver(&mut self, recipients: &RecipientSet, payload: Vec<u8>) {
        self.push((recipients.clone(), payload));
    }
}

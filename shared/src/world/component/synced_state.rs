use tether_serde::Serde;

use crate::world::component::synced_field::{ComponentLayout, FieldValue};

/// Live state of a component made of bounded scalars. The simulation layer
/// owns the values; a `FieldSyncChannel` reads and writes them by field
/// index, in the order given by `layout()`.
pub trait SyncedState: 'static {
    fn layout() -> ComponentLayout
    where
        Self: Sized;

    fn field(&self, index: usize) -> FieldValue;

    fn set_field(&mut self, index: usize, value: FieldValue);

    /// Describes why moving field `index` from `old` to `new` weakens a
    /// safety invariant, if it does. Authorised writes that return `Some`
    /// are reported to the blame tracker.
    fn regression(_index: usize, _old: FieldValue, _new: FieldValue) -> Option<String>
    where
        Self: Sized,
    {
        None
    }
}

/// Live state of a component that replicates a list of units, such as the
/// node coordinates of a wire. Lists may exceed one message and are chunked.
pub trait SyncedList: 'static {
    type Unit: Serde;

    fn units(&self) -> &[Self::Unit];

    fn set_units(&mut self, units: Vec<Self::Unit>);
}

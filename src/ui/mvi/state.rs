/// View state held by a [`Store`](super::Store).
///
/// `Default` is the reset value, and `PartialEq` decides whether a dispatch
/// published anything.
pub trait UiState: Clone + PartialEq + Default + Send + 'static {}

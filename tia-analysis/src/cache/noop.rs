//! The cache that stores nothing.

use tia_core::traits::KeyedCache;

/// Computes every time. Exists to prove the algorithms never depend on a
/// cache hit.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl<K, V> KeyedCache<K, V> for NoopCache
where
    K: Send + Sync,
    V: Send + Sync,
{
    fn get_or_compute(&self, _key: K, factory: &mut dyn FnMut() -> V) -> V {
        factory()
    }

    fn clear_all(&self) {}
}

/// Read-through caching around an async lookup.
///
/// Returns the cached value for `$key` when present. Otherwise awaits `$block`, queues the
/// result for caching under the key's TTL, and returns it. Cache failures count as misses;
/// errors from `$block` propagate with `?`.
///
/// # Example
/// ```rust,ignore
/// let genres: HashMap<u32, String> = cached!(self.cache, CacheKey::GenreList, async {
///     self.fetch_genre_list().await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $block:expr) => {{
        let key = $key;
        if let Some(hit) = $cache.lookup(&key).await {
            tracing::debug!(key = %key, "Cache hit");
            Ok(hit)
        } else {
            match $block.await {
                Ok(value) => {
                    $cache.set_in_background(&key, &value);
                    Ok(value)
                }
                Err(e) => Err(e),
            }
        }
    }};
}

//! Redis-backed page cache and rate limit counters.
//!
//! Rendered read models are stored under `page:<path>[?<query>]#<generation>`.
//! Revalidating a path bumps its generation, so a render that read the
//! database before the bump can only land under a key nobody reads, and then
//! evicts the old entries.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};

use crate::config::{
    Config, CACHE_PREFIX_PAGE, CACHE_PREFIX_PAGE_GENERATION, CACHE_PREFIX_RATE_LIMIT,
    DEFAULT_PAGE_TTL_SECONDS,
};
use crate::errors::AppResult;

#[cfg(test)]
use mockall::automock;

/// Cache operations the application needs; implemented by [`Cache`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Current generation of a path (without query string). Read it before
    /// querying the database for a page of that path.
    async fn page_generation(&self, path: &str) -> AppResult<u64>;

    /// Cached body for a path (including its query string)
    async fn get_page(&self, path: &str, generation: u64) -> AppResult<Option<String>>;

    /// Store a rendered body for a path (including its query string)
    async fn put_page(&self, path: &str, generation: u64, body: &str) -> AppResult<()>;

    /// Bump the generation of `path`, then evict its cached page and all of
    /// its query variants. Returns the number of evicted entries.
    async fn revalidate_path(&self, path: &str) -> AppResult<u64>;

    /// Check and increment a fixed-window counter.
    /// Returns `(current_count, is_allowed)`.
    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)>;

    async fn ping(&self) -> AppResult<()>;
}

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
    page_ttl: u64,
}

impl Cache {
    /// Connect to Redis.
    pub async fn connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");

        Ok(Self {
            connection,
            page_ttl: DEFAULT_PAGE_TTL_SECONDS,
        })
    }

    /// Delete all keys matching a glob pattern, walking the keyspace with
    /// `SCAN` so Redis is never blocked.
    async fn delete_pattern(&self, pattern: &str) -> AppResult<u64> {
        let mut conn = self.connection.clone();
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) =
                scan_command(cursor, pattern).query_async(&mut conn).await?;

            if !keys.is_empty() {
                let removed: u64 = conn.del(&keys).await?;
                deleted += removed;
            }
            if next == 0 {
                return Ok(deleted);
            }
            cursor = next;
        }
    }
}

const SCAN_BATCH: u64 = 100;

fn scan_command(cursor: u64, pattern: &str) -> redis::Cmd {
    let mut cmd = redis::cmd("SCAN");
    cmd.cursor_arg(cursor)
        .arg("MATCH")
        .arg(pattern)
        .arg("COUNT")
        .arg(SCAN_BATCH);
    cmd
}

/// MULTI: start the window with its TTL if absent, then count this request.
/// INCR keeps the TTL set by SET, so the window always expires.
fn rate_limit_pipeline(key: &str, window_seconds: u64) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .cmd("SET")
        .arg(key)
        .arg(0)
        .arg("EX")
        .arg(window_seconds)
        .arg("NX")
        .ignore()
        .cmd("INCR")
        .arg(key);
    pipe
}

/// Cache key of one generation of a page.
pub fn page_key(path: &str, generation: u64) -> String {
    format!("{}{}#{}", CACHE_PREFIX_PAGE, path, generation)
}

fn generation_key(path: &str) -> String {
    format!("{}{}", CACHE_PREFIX_PAGE_GENERATION, path)
}

fn rate_limit_key(identifier: &str) -> String {
    format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier)
}

/// Escape glob metacharacters so a path can prefix a `SCAN MATCH` pattern.
fn escape_glob(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl CacheStore for Cache {
    async fn page_generation(&self, path: &str) -> AppResult<u64> {
        let mut conn = self.connection.clone();
        let generation: Option<u64> = conn.get(generation_key(path)).await?;
        Ok(generation.unwrap_or(0))
    }

    async fn get_page(&self, path: &str, generation: u64) -> AppResult<Option<String>> {
        let mut conn = self.connection.clone();
        Ok(conn.get(page_key(path, generation)).await?)
    }

    async fn put_page(&self, path: &str, generation: u64, body: &str) -> AppResult<()> {
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(page_key(path, generation), body, self.page_ttl)
            .await?;
        Ok(())
    }

    async fn revalidate_path(&self, path: &str) -> AppResult<u64> {
        let mut conn = self.connection.clone();
        let generation: u64 = conn.incr(generation_key(path), 1).await?;

        let prefix = format!("{}{}", CACHE_PREFIX_PAGE, escape_glob(path));
        let exact = self.delete_pattern(&format!("{}#*", prefix)).await?;
        let variants = self.delete_pattern(&format!("{}?*", prefix)).await?;

        tracing::debug!(path, generation, evicted = exact + variants, "Revalidated path");
        Ok(exact + variants)
    }

    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = rate_limit_key(identifier);
        let mut conn = self.connection.clone();

        let (count,): (u64,) = rate_limit_pipeline(&key, window_seconds)
            .query_async(&mut conn)
            .await?;

        Ok((count, count <= max_requests))
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_key() {
        assert_eq!(page_key("/dashboard/invoices", 0), "page:/dashboard/invoices#0");
        assert_eq!(
            page_key("/dashboard/invoices?query=lee&page=2", 3),
            "page:/dashboard/invoices?query=lee&page=2#3"
        );
    }

    #[test]
    fn test_generations_do_not_share_keys() {
        let path = "/dashboard/invoices?query=&page=1";
        assert_ne!(page_key(path, 1), page_key(path, 2));
        assert_eq!(generation_key("/dashboard/invoices"), "page_gen:/dashboard/invoices");
    }

    fn packed(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_rate_limit_window_is_one_transaction() {
        let wire = packed(rate_limit_pipeline("rate_limit:login:1.2.3.4", 60).get_packed_pipeline());

        let order = ["MULTI", "SET", "EX", "60", "NX", "INCR", "EXEC"]
            .iter()
            .map(|token| wire.find(&format!("\r\n{}\r\n", token)).unwrap())
            .collect::<Vec<_>>();
        assert!(order.windows(2).all(|pair| pair[0] < pair[1]), "{wire:?}");
        assert!(!wire.contains("EXISTS"));
    }

    #[test]
    fn test_revalidation_scans_instead_of_keys() {
        let wire = packed(scan_command(0, "page:/dashboard/invoices?*").get_packed_command());

        assert!(wire.contains("\r\nSCAN\r\n"));
        assert!(wire.contains("\r\nMATCH\r\n"));
        assert!(wire.contains("page:/dashboard/invoices?*"));
        assert!(!wire.contains("KEYS"));
    }

    #[test]
    fn test_rate_limit_key() {
        assert_eq!(rate_limit_key("login:10.0.0.1"), "rate_limit:login:10.0.0.1");
    }

    #[test]
    fn test_escape_glob() {
        assert_eq!(escape_glob("page:/dashboard"), "page:/dashboard");
        assert_eq!(escape_glob("a*b?[c]"), "a\\*b\\?\\[c\\]");
    }
}

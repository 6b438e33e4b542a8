//! Cached service-account session.
//!
//! Server-side ORM calls run as the configured service account. The web
//! session obtained at login is reused until it is older than the TTL or the
//! ERP reports it expired. The lock is held while logging in, so callers that
//! arrive during a login wait for it instead of starting their own.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::OdooError;

#[derive(Debug, Clone)]
struct CachedSession {
    session_id: String,
    established: Instant,
}

#[derive(Debug)]
pub struct ServiceSession {
    ttl: Duration,
    state: Mutex<Option<CachedSession>>,
}

impl ServiceSession {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Mutex::new(None),
        }
    }

    /// Returns the cached session id, logging in through `login` when there is
    /// none or it has outlived the TTL.
    pub async fn get_or_authenticate<F, Fut>(&self, login: F) -> Result<String, OdooError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, OdooError>>,
    {
        let mut guard = self.state.lock().await;

        if let Some(cached) = guard.as_ref() {
            if cached.established.elapsed() < self.ttl {
                return Ok(cached.session_id.clone());
            }
            debug!("Service session outlived its TTL");
        }

        let session_id = login().await?;
        info!("Service session established");
        *guard = Some(CachedSession {
            session_id: session_id.clone(),
            established: Instant::now(),
        });

        Ok(session_id)
    }

    /// Forget the cached session if it is still `stale`; the next call logs
    /// in again. A session another caller has already replaced is kept.
    pub async fn clear(&self, stale: &str) {
        let mut guard = self.state.lock().await;
        if guard.as_ref().is_some_and(|cached| cached.session_id == stale) {
            *guard = None;
        } else {
            debug!("Service session already refreshed");
        }
    }

    pub async fn is_established(&self) -> bool {
        self.state
            .lock()
            .await
            .as_ref()
            .is_some_and(|cached| cached.established.elapsed() < self.ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_concurrent_callers_share_one_login() {
        let session = Arc::new(ServiceSession::new(Duration::from_secs(60)));
        let logins = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let session = session.clone();
            let logins = logins.clone();
            handles.push(tokio::spawn(async move {
                session
                    .get_or_authenticate(|| async move {
                        logins.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok("sid-1".to_string())
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "sid-1");
        }
        assert_eq!(logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_session_logs_in_again() {
        let session = ServiceSession::new(Duration::ZERO);
        let first = session
            .get_or_authenticate(|| async { Ok("sid-1".to_string()) })
            .await
            .unwrap();
        let second = session
            .get_or_authenticate(|| async { Ok("sid-2".to_string()) })
            .await
            .unwrap();
        assert_eq!(first, "sid-1");
        assert_eq!(second, "sid-2");
    }

    #[tokio::test]
    async fn test_failed_login_is_not_cached() {
        let session = ServiceSession::new(Duration::from_secs(60));
        let err = session
            .get_or_authenticate(|| async { Err(OdooError::InvalidCredentials) })
            .await
            .unwrap_err();
        assert!(matches!(err, OdooError::InvalidCredentials));
        assert!(!session.is_established().await);

        let sid = session
            .get_or_authenticate(|| async { Ok("sid-3".to_string()) })
            .await
            .unwrap();
        assert_eq!(sid, "sid-3");
    }

    #[tokio::test]
    async fn test_clear() {
        let session = ServiceSession::new(Duration::from_secs(60));
        session
            .get_or_authenticate(|| async { Ok("sid".to_string()) })
            .await
            .unwrap();
        assert!(session.is_established().await);
        session.clear("sid").await;
        assert!(!session.is_established().await);
    }

    #[tokio::test]
    async fn test_clear_keeps_a_refreshed_session() {
        let session = ServiceSession::new(Duration::from_secs(60));
        session
            .get_or_authenticate(|| async { Ok("sid-new".to_string()) })
            .await
            .unwrap();

        session.clear("sid-old").await;
        assert!(session.is_established().await);

        let sid = session
            .get_or_authenticate(|| async { Ok("sid-unused".to_string()) })
            .await
            .unwrap();
        assert_eq!(sid, "sid-new");
    }
}

use crate::backend::ShelfBackend;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{Profile, ReadingStats};
use crate::session::User;
use tracing::error;

/// A read-only profile page: who, and how much they read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub profile: Profile,
    /// Missing when the user has no stats row yet.
    pub stats: Option<ReadingStats>,
    /// The viewer is looking at their own profile (sign-out is offered).
    pub is_own: bool,
}

pub async fn run<B: ShelfBackend + ?Sized>(
    backend: &B,
    viewer: Option<&User>,
    user_id: &str,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    let fetched = async {
        let profile = backend.get_profile(user_id).await?;
        let stats = match profile {
            Some(_) => backend.get_stats(user_id).await?,
            None => None,
        };
        Ok::<_, crate::error::ShelfError>((profile, stats))
    }
    .await;

    match fetched {
        Ok((Some(profile), stats)) => {
            let is_own = viewer.is_some_and(|u| u.id == user_id);
            Ok(result.with_profile(ProfileView {
                profile,
                stats,
                is_own,
            }))
        }
        Ok((None, _)) => {
            result.add_message(CmdMessage::warning("Profile not found"));
            Ok(result)
        }
        Err(e) => {
            error!(%user_id, error = %e, "error fetching profile");
            result.add_message(CmdMessage::error("Failed to load profile"));
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::InMemoryBackend;
    use chrono::Utc;

    fn profile(id: &str) -> Profile {
        Profile {
            id: id.into(),
            username: "reader".into(),
            bio: None,
            avatar_url: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn own_profile_with_stats() {
        let mut stats = ReadingStats::new("u1");
        stats.total_books_read = 4;
        stats.favorite_genre = Some("Sci-Fi".into());
        let backend = InMemoryBackend::new()
            .with_profile(profile("u1"))
            .with_stats(stats);

        let result = run(&backend, Some(&User::new("u1")), "u1").await.unwrap();

        let view = result.profile.unwrap();
        assert!(view.is_own);
        let stats = view.stats.unwrap();
        assert_eq!(stats.total_books_read, 4);
        assert_eq!(stats.favorite_genre.as_deref(), Some("Sci-Fi"));
    }

    #[tokio::test]
    async fn someone_elses_profile_without_stats() {
        let backend = InMemoryBackend::new().with_profile(profile("u2"));

        let result = run(&backend, Some(&User::new("u1")), "u2").await.unwrap();

        let view = result.profile.unwrap();
        assert!(!view.is_own);
        assert!(view.stats.is_none());
    }

    #[tokio::test]
    async fn missing_profile_is_reported() {
        let backend = InMemoryBackend::new();
        let result = run(&backend, None, "nobody").await.unwrap();
        assert!(result.profile.is_none());
        assert_eq!(result.messages[0].content, "Profile not found");
    }

    #[tokio::test]
    async fn backend_failure_is_reported() {
        let backend = InMemoryBackend::new().failing_queries();
        let result = run(&backend, None, "u1").await.unwrap();
        assert!(result.has_errors());
        assert_eq!(result.messages[0].content, "Failed to load profile");
    }
}

use crate::{
    api::{Error, Session, User},
    BlogApi,
};

/// What to keep of a stored session once the server answered the profile
/// request made with its token
///
/// Only a rejected token drops the session: an unreachable server leaves it
/// as it was.
pub fn checked_session(session: Session, profile: Result<User, Error>) -> Option<Session> {
    match profile {
        Ok(user) => Some(Session {
            user: Some(user),
            ..session
        }),
        Err(Error::Unauthenticated) => {
            tracing::info!("stored session is no longer valid");
            None
        }
        Err(e) => {
            tracing::warn!(error = ?e, "could not verify stored session");
            Some(session)
        }
    }
}

/// `api` must carry the token of `session`
pub async fn verify_session<A: BlogApi + ?Sized>(api: &A, session: Session) -> Option<Session> {
    let profile = api.profile().await;
    checked_session(session, profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AuthToken, Role, UserId};

    fn session() -> Session {
        Session {
            token: AuthToken(String::from("t")),
            user: None,
        }
    }

    #[test]
    fn profile_refreshes_user() {
        let user = User {
            id: UserId(1),
            username: String::from("alice"),
            display_name: None,
            email: None,
            avatar_url: None,
            role: Role::Admin,
        };
        let s = checked_session(session(), Ok(user.clone())).unwrap();
        assert_eq!(s.user, Some(user));
    }

    #[test]
    fn only_rejected_tokens_log_out() {
        assert_eq!(checked_session(session(), Err(Error::Unauthenticated)), None);
        assert_eq!(
            checked_session(session(), Err(Error::Network(String::from("offline")))),
            Some(session())
        );
    }
}

use tracing::{info, warn};

use flockr_types::api::UserView;
use flockr_types::models::UserId;

use crate::avatar::CropBox;
use crate::error::{FlockrError, Result};
use crate::{Flockr, validate, views};

/// Path part of a URL, without query or fragment.
fn url_path(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

impl Flockr {
    pub fn user_profile(&self, token: &str, u_id: UserId) -> Result<UserView> {
        self.store().with_state(|state| {
            self.sessions().authenticate(state, token)?;
            state
                .user(u_id)
                .map(views::user)
                .ok_or_else(|| FlockrError::not_found("Please enter a valid user id"))
        })
    }

    pub fn user_profile_setname(&self, token: &str, name_first: &str, name_last: &str) -> Result<()> {
        self.store().with_state_mut(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            if !validate::name(name_first) || !validate::name(name_last) {
                return Err(FlockrError::validation(
                    "Please enter a first and last name between 1 and 50 characters each.",
                ));
            }

            let user = state.user_mut(caller).ok_or_else(FlockrError::not_authorised)?;
            user.name_first = name_first.to_string();
            user.name_last = name_last.to_string();
            Ok(())
        })
    }

    pub fn user_profile_setemail(&self, token: &str, email: &str) -> Result<()> {
        self.store().with_state_mut(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            validate::email(email)?;
            if state.email_taken(email) {
                return Err(FlockrError::validation("Email address is already being used"));
            }

            let user = state.user_mut(caller).ok_or_else(FlockrError::not_authorised)?;
            user.email = email.to_string();
            Ok(())
        })
    }

    pub fn user_profile_sethandle(&self, token: &str, handle: &str) -> Result<()> {
        self.store().with_state_mut(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            validate::handle(handle)?;
            if state.handle_taken(handle) {
                return Err(FlockrError::validation("Handle is already being used"));
            }

            let user = state.user_mut(caller).ok_or_else(FlockrError::not_authorised)?;
            user.handle = handle.to_string();
            Ok(())
        })
    }

    /// Fetches a JPEG from `img_url`, crops it and makes it the caller's
    /// profile photo. The store lock is not held while downloading.
    pub async fn user_profile_uploadphoto(
        &self,
        token: &str,
        img_url: &str,
        crop: CropBox,
    ) -> Result<()> {
        let caller = self.store().with_state(|state| {
            let caller = self.sessions().authenticate(state, token)?;
            if !url_path(img_url).ends_with(".jpg") {
                return Err(FlockrError::validation("Image uploaded is not a JPG"));
            }
            if !crop.is_well_formed() {
                return Err(FlockrError::validation("Crop dimensions are not valid"));
            }
            Ok(caller)
        })?;

        let public_url = self
            .inner
            .avatars
            .fetch_and_crop(img_url, crop)
            .await
            .map_err(|e| {
                warn!("Avatar upload for user {} failed: {}", caller, e);
                FlockrError::validation(format!("Unable to use image: {}", e))
            })?;

        self.store().with_state_mut(|state| {
            let user = state.user_mut(caller).ok_or_else(FlockrError::not_authorised)?;
            user.avatar_url = Some(public_url.clone());
            Ok(())
        })?;

        info!("User {} profile photo set to {}", caller, public_url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use futures_util::future::BoxFuture;

    use crate::avatar::{AvatarStore, CropBox};
    use crate::error::ErrorKind;
    use crate::testing;
    use crate::Flockr;

    /// Accepts every download and remembers what it was asked for.
    #[derive(Default)]
    struct FakeAvatars {
        fetched: Mutex<Vec<(String, CropBox)>>,
    }

    impl AvatarStore for FakeAvatars {
        fn fetch_and_crop<'a>(
            &'a self,
            url: &'a str,
            crop: CropBox,
        ) -> BoxFuture<'a, anyhow::Result<String>> {
            Box::pin(async move {
                if url.contains("missing") {
                    anyhow::bail!("HTTP status 404");
                }
                let mut fetched = self.fetched.lock().unwrap();
                fetched.push((url.to_string(), crop));
                Ok(format!("http://localhost/static/{}.jpg", fetched.len()))
            })
        }

        fn purge(&self) -> BoxFuture<'_, anyhow::Result<()>> {
            Box::pin(async move {
                self.fetched.lock().unwrap().clear();
                Ok(())
            })
        }
    }

    const CROP: CropBox = CropBox { x_start: 0, y_start: 0, x_end: 100, y_end: 100 };

    #[test]
    fn profile_of_unknown_user_fails() {
        let flockr = testing::flockr();
        let owner = testing::register(&flockr, "Fiona", "Wang");

        let profile = flockr.user_profile(&owner.token, owner.u_id).unwrap();
        assert_eq!(profile.handle_str, "fionawang0");
        assert_eq!(profile.email, "fionawang@example.com");
        assert_eq!(profile.profile_img_url, None);

        let err = flockr.user_profile(&owner.token, 42).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn setname_bounds() {
        let flockr = testing::flockr();
        let owner = testing::register(&flockr, "Fiona", "Wang");

        flockr.user_profile_setname(&owner.token, "Fi", "W").unwrap();
        let profile = flockr.user_profile(&owner.token, owner.u_id).unwrap();
        assert_eq!((profile.name_first.as_str(), profile.name_last.as_str()), ("Fi", "W"));

        let err = flockr.user_profile_setname(&owner.token, "", "W").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = flockr.user_profile_setname(&owner.token, "Fi", &"w".repeat(51)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn setemail_requires_valid_unused_address() {
        let flockr = testing::flockr();
        let users = testing::users(&flockr, 2);

        let err = flockr.user_profile_setemail(&users[1].token, "not-an-email").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = flockr.user_profile_setemail(&users[1].token, "usern0@example.com").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        flockr.user_profile_setemail(&users[1].token, "fresh@example.com").unwrap();
        let login = flockr.login("fresh@example.com", "password123").unwrap();
        assert_eq!(login.u_id, users[1].u_id);
    }

    #[test]
    fn sethandle_requires_valid_unused_handle() {
        let flockr = testing::flockr();
        let users = testing::users(&flockr, 2);

        let err = flockr.user_profile_sethandle(&users[1].token, "ab").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = flockr.user_profile_sethandle(&users[1].token, &"h".repeat(21)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = flockr.user_profile_sethandle(&users[1].token, "usern00").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        flockr.user_profile_sethandle(&users[1].token, "night_owl").unwrap();
        let profile = flockr.user_profile(&users[0].token, users[1].u_id).unwrap();
        assert_eq!(profile.handle_str, "night_owl");
    }

    #[tokio::test]
    async fn upload_sets_avatar_url() {
        let avatars = Arc::new(FakeAvatars::default());
        let flockr = Flockr::builder(testing::config())
            .avatars(avatars.clone())
            .build()
            .unwrap();
        let owner = testing::register(&flockr, "Fiona", "Wang");

        flockr
            .user_profile_uploadphoto(&owner.token, "https://img.example.com/me.jpg?size=large", CROP)
            .await
            .unwrap();

        let profile = flockr.user_profile(&owner.token, owner.u_id).unwrap();
        assert_eq!(profile.profile_img_url.as_deref(), Some("http://localhost/static/1.jpg"));
        assert_eq!(avatars.fetched.lock().unwrap()[0].1, CROP);

        flockr.clear().await;
        assert!(avatars.fetched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_rejects_bad_input_and_failed_downloads() {
        let flockr = Flockr::builder(testing::config())
            .avatars(Arc::new(FakeAvatars::default()))
            .build()
            .unwrap();
        let owner = testing::register(&flockr, "Fiona", "Wang");

        let err = flockr
            .user_profile_uploadphoto(&owner.token, "https://img.example.com/me.png", CROP)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let inverted = CropBox { x_start: 50, x_end: 10, ..CROP };
        let err = flockr
            .user_profile_uploadphoto(&owner.token, "https://img.example.com/me.jpg", inverted)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = flockr
            .user_profile_uploadphoto(&owner.token, "https://img.example.com/missing.jpg", CROP)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let profile = flockr.user_profile(&owner.token, owner.u_id).unwrap();
        assert_eq!(profile.profile_img_url, None);
    }

    #[tokio::test]
    async fn uploads_are_refused_without_an_avatar_store() {
        let flockr = testing::flockr();
        let owner = testing::register(&flockr, "Fiona", "Wang");

        let err = flockr
            .user_profile_uploadphoto(&owner.token, "https://img.example.com/me.jpg", CROP)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}

use tracing::info;

use flockr_store::models::ChannelRecord;
use flockr_types::api::ChannelSummary;
use flockr_types::models::{ChannelId, Visibility};

use crate::Flockr;
use crate::error::Result;
use crate::validate;

impl Flockr {
    /// Creates a channel with the caller as its sole owner and member.
    pub fn channels_create(&self, token: &str, name: &str, is_public: bool) -> Result<ChannelId> {
        let channel_id = self.store().with_state_mut(|state| {
            let user_id = self.sessions().authenticate(state, token)?;
            validate::channel_name(name)?;

            let id = state.next_channel_id();
            state.channels.push(ChannelRecord::new(
                id,
                name.to_string(),
                Visibility::from_is_public(is_public),
                user_id,
            ));
            Ok(id)
        })?;

        info!("Channel {} ({}) created", channel_id, name);
        Ok(channel_id)
    }

    /// Channels the caller belongs to.
    pub fn channels_list(&self, token: &str) -> Result<Vec<ChannelSummary>> {
        self.store().with_state(|state| {
            let user_id = self.sessions().authenticate(state, token)?;
            Ok(state
                .channels
                .iter()
                .filter(|c| c.is_member(user_id))
                .map(summary)
                .collect())
        })
    }

    pub fn channels_listall(&self, token: &str) -> Result<Vec<ChannelSummary>> {
        self.store().with_state(|state| {
            self.sessions().authenticate(state, token)?;
            Ok(state.channels.iter().map(summary).collect())
        })
    }
}

fn summary(channel: &ChannelRecord) -> ChannelSummary {
    ChannelSummary {
        channel_id: channel.id,
        name: channel.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::testing;

    #[test]
    fn ids_are_sequential() {
        let flockr = testing::flockr();
        let owner = testing::register(&flockr, "Fiona", "Wang");

        assert_eq!(flockr.channels_create(&owner.token, "one", true).unwrap(), 1);
        assert_eq!(flockr.channels_create(&owner.token, "two", false).unwrap(), 2);
    }

    #[test]
    fn names_longer_than_twenty_are_rejected() {
        let flockr = testing::flockr();
        let owner = testing::register(&flockr, "Fiona", "Wang");

        let err = flockr
            .channels_create(&owner.token, "a-very-long-channel-name", true)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(flockr.channels_listall(&owner.token).unwrap().is_empty());
    }

    #[test]
    fn list_only_shows_joined_channels() {
        let flockr = testing::flockr();
        let users = testing::users(&flockr, 2);
        flockr.channels_create(&users[0].token, "mine", true).unwrap();
        let theirs = flockr.channels_create(&users[1].token, "theirs", true).unwrap();

        let listed = flockr.channels_list(&users[1].token).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].channel_id, theirs);
        assert_eq!(listed[0].name, "theirs");

        assert_eq!(flockr.channels_listall(&users[1].token).unwrap().len(), 2);
    }

    #[test]
    fn invalid_token_is_an_auth_failure() {
        let flockr = testing::flockr();
        let err = flockr.channels_create("bogus", "general", true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(flockr.channels_list("bogus").unwrap_err().kind(), ErrorKind::Auth);
    }
}

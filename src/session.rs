use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::client::{ApiContext, GROUP_CONTENTS_PATH, OjError, UPDATE_GROUP_PATH, decode, error_code};
use crate::group::Group;
use crate::models::oj::{GroupContent, GroupContentsResponse, SetGroup, UpdateGroupRequest};

/// A signed-in session. Cheap to clone; every clone and every [`Group`] obtained
/// from it share the same credentials and transport.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: ApiContext,
    session_id: String,
    created: Instant,
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session").field("age", &self.age()).finish_non_exhaustive()
    }
}

impl Session {
    pub(crate) fn new(api: ApiContext, session_id: String) -> Self {
        Session {
            inner: Arc::new(SessionInner {
                api,
                session_id,
                created: Instant::now(),
            }),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    /// Time since sign in. Sessions are never renewed; callers decide when to sign in again.
    pub fn age(&self) -> Duration {
        self.inner.created.elapsed()
    }

    /// List the account's groups with their current thermostat state.
    pub fn groups(&self) -> Result<Vec<Group>, OjError> {
        let contents = self.group_contents()?;
        info!("Discovered {} group(s)", contents.len());
        Ok(contents.into_iter().map(|c| Group::new(self.clone(), c)).collect())
    }

    pub(crate) fn group_contents(&self) -> Result<Vec<GroupContent>, OjError> {
        let query = [
            ("sessionid", self.inner.session_id.as_str()),
            ("apiKey", self.inner.api.api_key.as_str()),
        ];
        let body = self.inner.api.get(GROUP_CONTENTS_PATH, &query)?;

        let code = error_code(GROUP_CONTENTS_PATH, &body)?;
        if code != 0 {
            warn!("Group contents request failed with error code {}", code);
            return Err(OjError::Api { code });
        }

        let res: GroupContentsResponse = decode(GROUP_CONTENTS_PATH, body)?;
        Ok(res.group_contents.unwrap_or_default())
    }

    pub(crate) fn update_group(&self, set_group: SetGroup) -> Result<(), OjError> {
        let group_id = set_group.group_id;
        let mode = set_group.change.regulation_mode();
        let req = UpdateGroupRequest {
            api_key: &self.inner.api.api_key,
            set_group,
        };
        debug!("Updating group {} to {:?}", group_id, mode);
        let body = self
            .inner
            .api
            .post(UPDATE_GROUP_PATH, &[("sessionid", self.inner.session_id.as_str())], &req)?;

        let code = error_code(UPDATE_GROUP_PATH, &body)?;
        if code != 0 {
            warn!("Update of group {} to {:?} failed with error code {}", group_id, mode, code);
            return Err(OjError::Update { group_id, code });
        }
        info!("Group {} set to {:?}", group_id, mode);
        Ok(())
    }
}

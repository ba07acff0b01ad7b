use crate::common::{RewriteIdentity, RewriteRecord};

#[derive(serde::Serialize)]
pub(super) struct UpdateRequest<'a> {
    pub target: &'a RewriteIdentity,
    pub update: &'a RewriteRecord,
}

/// Body of the list endpoint. Some versions answer `null` instead of `[]`.
pub(super) type ListResponse = Option<Vec<RewriteRecord>>;

/// The region in which buckets are created without a location constraint.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Location constraint to send with CreateBucket for `region`.
///
/// S3 rejects an explicit `us-east-1` constraint, so the default region
/// (and an unset one) yields `None`.
pub fn location_constraint(region: &str) -> Option<&str> {
    let region = region.trim();
    if region.is_empty() || region == DEFAULT_REGION {
        None
    } else {
        Some(region)
    }
}

use crate::types::{Fetch, LatestStatusMap, SubmissionMap};

/// Reduces a student's submissions to the status of the latest submission per
/// exercise.
///
/// The last element of each sequence is taken as latest; the order is the
/// source's and is never re-sorted here. Exercises missing from the map, with
/// an empty sequence, or whose latest record carries no status get no entry,
/// which downstream reads as "no attempt". A fetch that is not ready resolves
/// to an empty map.
pub fn latest_statuses(submissions: &Fetch<SubmissionMap>) -> LatestStatusMap {
    let Some(submissions) = submissions.ready() else {
        return LatestStatusMap::new();
    };

    submissions
        .iter()
        .filter_map(|(exercise, records)| {
            let latest = records.last();
            if latest.is_none() {
                tracing::debug!("No submissions listed for `{exercise}`, treating as unattempted");
            }
            let status = latest?.status()?;
            Some((exercise.clone(), status.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SubmissionRecord;

    fn map(entries: &[(&str, &[&str])]) -> Fetch<SubmissionMap> {
        Fetch::Ready(
            entries
                .iter()
                .map(|(name, statuses)| {
                    (
                        name.to_string(),
                        statuses
                            .iter()
                            .map(|s| SubmissionRecord::with_status(*s))
                            .collect(),
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn last_submission_wins() {
        let out = latest_statuses(&map(&[
            ("loops", &["UNSUCCESSFUL", "SUCCESSFUL"]),
            ("arrays", &["SUCCESSFUL", "ERROR"]),
        ]));

        assert_eq!(out.get("loops").map(String::as_str), Some("SUCCESSFUL"));
        assert_eq!(out.get("arrays").map(String::as_str), Some("ERROR"));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn empty_sequences_and_missing_statuses_are_unattempted() {
        let mut submissions = SubmissionMap::new();
        submissions.insert("loops".into(), Vec::new());
        submissions.insert("maps".into(), vec![SubmissionRecord::default()]);

        assert!(latest_statuses(&Fetch::Ready(submissions)).is_empty());
    }

    #[test]
    fn pending_fetch_resolves_to_nothing() {
        assert!(latest_statuses(&Fetch::Loading).is_empty());
        assert!(latest_statuses(&Fetch::Failed("timeout".into())).is_empty());
    }
}

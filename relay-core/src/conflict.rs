//! Last-writer-wins conflict resolution.
//!
//! Concurrent snapshots for the same stream are ordered by a deterministic
//! total order over `(rev, created_at, device_id)`: higher revision first,
//! then higher transport creation time, then the lexicographically smaller
//! device id. Winner selection works on message tags alone, so many
//! candidates can be compared before paying the decryption cost on one.

use relay_types::SignedMessage;

/// Which of the two compared candidates wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    /// The first argument.
    A,
    /// The second argument.
    B,
}

/// Projection of a message used purely for ordering.
///
/// Constructed transiently; owns nothing beyond the comparison call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictCandidate {
    /// Revision counter, the primary ordering key.
    pub rev: u64,
    /// Transport-assigned creation time, the secondary key.
    pub created_at: u64,
    /// Device identity, the final tie-breaker.
    pub device_id: String,
}

impl ConflictCandidate {
    /// Project a transport message into ordering form.
    ///
    /// Missing or unparseable `rev`/`device` tags degrade to `0` and the
    /// empty string: legacy messages are deprioritized, never rejected.
    pub fn from_message(message: &SignedMessage) -> Self {
        Self {
            rev: message.tags.rev().unwrap_or(0),
            created_at: message.created_at,
            device_id: message.tags.device().unwrap_or("").to_string(),
        }
    }
}

/// Resolve a conflict between two candidates.
///
/// Priority: higher `rev`, then higher `created_at`, then the
/// lexicographically *smaller* `device_id` (a stable, content-derived
/// winner). Strict total order for distinct triples; fully-equal triples
/// resolve to [`Winner::B`], which either way names the same value.
pub fn resolve_conflict(a: &ConflictCandidate, b: &ConflictCandidate) -> Winner {
    if a.rev != b.rev {
        return if a.rev > b.rev { Winner::A } else { Winner::B };
    }
    if a.created_at != b.created_at {
        return if a.created_at > b.created_at {
            Winner::A
        } else {
            Winner::B
        };
    }
    if a.device_id < b.device_id {
        Winner::A
    } else {
        Winner::B
    }
}

/// Select the winning message from a set of candidates.
///
/// Reduces pairwise via [`resolve_conflict`] using each message's tags and
/// transport creation time. Never decrypts. Empty input yields `None`; a
/// single element is returned without comparison.
pub fn select_best(messages: &[SignedMessage]) -> Option<&SignedMessage> {
    let (first, rest) = messages.split_first()?;
    if rest.is_empty() {
        return Some(first);
    }

    Some(rest.iter().fold(first, |best, current| {
        let winner = resolve_conflict(
            &ConflictCandidate::from_message(best),
            &ConflictCandidate::from_message(current),
        );
        match winner {
            Winner::A => best,
            Winner::B => current,
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_types::{DeviceId, MessageId, StreamKey, TagSet, SNAPSHOT_KIND};

    fn candidate(rev: u64, created_at: u64, device_id: &str) -> ConflictCandidate {
        ConflictCandidate {
            rev,
            created_at,
            device_id: device_id.to_string(),
        }
    }

    fn message(id: &str, rev: u64, created_at: u64, device: &str) -> SignedMessage {
        let key = StreamKey::new("test-app", "default");
        SignedMessage {
            id: MessageId::new(id),
            pubkey: "a".repeat(64),
            kind: SNAPSHOT_KIND,
            created_at,
            tags: TagSet::for_snapshot(&key, "test-app", "default", rev, &DeviceId::new(device)),
            content: "ciphertext".into(),
            sig: "sig".into(),
        }
    }

    #[test]
    fn highest_rev_wins() {
        let a = candidate(5, 100, "DEV_a");
        let b = candidate(3, 200, "DEV_b");
        assert_eq!(resolve_conflict(&a, &b), Winner::A);
        assert_eq!(resolve_conflict(&b, &a), Winner::B);
    }

    #[test]
    fn same_rev_newest_created_at_wins() {
        let a = candidate(5, 100, "DEV_a");
        let b = candidate(5, 200, "DEV_b");
        assert_eq!(resolve_conflict(&a, &b), Winner::B);
        assert_eq!(resolve_conflict(&b, &a), Winner::A);
    }

    #[test]
    fn same_rev_and_time_smaller_device_id_wins() {
        let a = candidate(5, 100, "DEV_b");
        let b = candidate(5, 100, "DEV_a");
        assert_eq!(resolve_conflict(&a, &b), Winner::B);
        assert_eq!(resolve_conflict(&b, &a), Winner::A);
    }

    #[test]
    fn order_is_antisymmetric_for_distinct_triples() {
        let cases = [
            (candidate(5, 100, "DEV_a"), candidate(3, 200, "DEV_b")),
            (candidate(5, 100, "DEV_a"), candidate(5, 200, "DEV_b")),
            (candidate(5, 100, "DEV_b"), candidate(5, 100, "DEV_a")),
        ];
        for (a, b) in cases {
            let forward = resolve_conflict(&a, &b);
            let backward = resolve_conflict(&b, &a);
            assert_ne!(forward, backward, "swapping arguments must flip the winner");
        }
    }

    #[test]
    fn order_is_transitive() {
        // a beats b, b beats c: a must beat c.
        let a = candidate(5, 100, "DEV_a");
        let b = candidate(4, 500, "DEV_b");
        let c = candidate(4, 100, "DEV_c");

        assert_eq!(resolve_conflict(&a, &b), Winner::A);
        assert_eq!(resolve_conflict(&b, &c), Winner::A);
        assert_eq!(resolve_conflict(&a, &c), Winner::A);
    }

    #[test]
    fn select_best_empty_is_none() {
        assert!(select_best(&[]).is_none());
    }

    #[test]
    fn select_best_singleton_is_that_element() {
        let messages = vec![message("only", 1, 100, "DEV_1")];
        let best = select_best(&messages).unwrap();
        assert_eq!(best.id, MessageId::new("only"));
    }

    #[test]
    fn select_best_is_not_dominated() {
        let messages = vec![
            message("m1", 1, 100, "DEV_1"),
            message("m2", 3, 50, "DEV_2"),
            message("m3", 2, 900, "DEV_3"),
        ];
        let best = select_best(&messages).unwrap();
        assert_eq!(best.id, MessageId::new("m2"));

        let best_candidate = ConflictCandidate::from_message(best);
        for other in &messages {
            if other.id == best.id {
                continue;
            }
            assert_eq!(
                resolve_conflict(&best_candidate, &ConflictCandidate::from_message(other)),
                Winner::A
            );
        }
    }

    #[test]
    fn select_best_result_order_independent() {
        let mut messages = vec![
            message("m1", 2, 100, "DEV_1"),
            message("m2", 2, 100, "DEV_0"),
            message("m3", 1, 999, "DEV_9"),
        ];
        let best = select_best(&messages).unwrap().id.clone();
        messages.reverse();
        assert_eq!(select_best(&messages).unwrap().id, best);
    }

    #[test]
    fn missing_tags_are_deprioritized() {
        let mut legacy = message("legacy", 0, 500, "");
        legacy.tags = TagSet::from_pairs(vec![("d".into(), "test-app:default".into())]);
        let tagged = message("tagged", 1, 100, "DEV_1");

        let messages = vec![legacy, tagged];
        assert_eq!(select_best(&messages).unwrap().id, MessageId::new("tagged"));
    }

    #[test]
    fn from_message_reads_tags_and_transport_time() {
        let msg = message("m", 7, 1705000000, "DEV_x");
        let candidate = ConflictCandidate::from_message(&msg);
        assert_eq!(candidate.rev, 7);
        assert_eq!(candidate.created_at, 1705000000);
        assert_eq!(candidate.device_id, "DEV_x");
    }
}

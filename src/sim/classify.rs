//! Collision pair classification
//!
//! Turns a raw engine collision pair into the gameplay contact it represents.
//! Pure: no state is touched here, the game loop dispatches on the result.

use glam::Vec2;

use super::board::{BUCKET_LABEL_PREFIX, PEG_LABEL};
use super::world::{BodySnapshot, CollisionPair};

pub const DISK_LABEL: &str = "disk";

/// What a body label means to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyLabel {
    Disk,
    Peg,
    /// Bucket with its parsed index, `None` if the suffix is not a number
    Bucket(Option<usize>),
    Other,
}

impl BodyLabel {
    pub fn parse(label: &str) -> Self {
        if label == DISK_LABEL {
            BodyLabel::Disk
        } else if label == PEG_LABEL {
            BodyLabel::Peg
        } else if let Some(index) = label.strip_prefix(BUCKET_LABEL_PREFIX) {
            BodyLabel::Bucket(index.parse().ok())
        } else {
            BodyLabel::Other
        }
    }
}

/// A collision pair the game cares about
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact<'a> {
    DiskBucket {
        disk: &'a BodySnapshot,
        bucket: Option<usize>,
    },
    DiskPeg {
        disk: &'a BodySnapshot,
        peg: &'a BodySnapshot,
        support: Vec2,
    },
    DiskDisk {
        a: &'a BodySnapshot,
        b: &'a BodySnapshot,
    },
}

/// Classify one pair. Bucket contacts win over peg contacts, which win over
/// disk stacking; anything else is `None`.
pub fn classify(pair: &CollisionPair) -> Option<Contact<'_>> {
    let label_a = BodyLabel::parse(&pair.a.label);
    let label_b = BodyLabel::parse(&pair.b.label);

    match (label_a, label_b) {
        (BodyLabel::Disk, BodyLabel::Bucket(bucket)) => Some(Contact::DiskBucket {
            disk: &pair.a,
            bucket,
        }),
        (BodyLabel::Bucket(bucket), BodyLabel::Disk) => Some(Contact::DiskBucket {
            disk: &pair.b,
            bucket,
        }),
        (BodyLabel::Disk, BodyLabel::Peg) => Some(Contact::DiskPeg {
            disk: &pair.a,
            peg: &pair.b,
            support: pair.support,
        }),
        (BodyLabel::Peg, BodyLabel::Disk) => Some(Contact::DiskPeg {
            disk: &pair.b,
            peg: &pair.a,
            support: pair.support,
        }),
        (BodyLabel::Disk, BodyLabel::Disk) => Some(Contact::DiskDisk {
            a: &pair.a,
            b: &pair.b,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::BodyHandle;

    fn body(id: u64, label: &str) -> BodySnapshot {
        BodySnapshot {
            handle: BodyHandle(id),
            label: label.to_string(),
            position: Vec2::new(id as f32, 0.0),
        }
    }

    fn pair(a: BodySnapshot, b: BodySnapshot) -> CollisionPair {
        CollisionPair {
            a,
            b,
            support: Vec2::new(1.0, 2.0),
        }
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!(BodyLabel::parse("disk"), BodyLabel::Disk);
        assert_eq!(BodyLabel::parse("peg"), BodyLabel::Peg);
        assert_eq!(BodyLabel::parse("bucket-4"), BodyLabel::Bucket(Some(4)));
        assert_eq!(BodyLabel::parse("bucket-x"), BodyLabel::Bucket(None));
        assert_eq!(BodyLabel::parse("bucket-"), BodyLabel::Bucket(None));
        assert_eq!(BodyLabel::parse("wall"), BodyLabel::Other);
        assert_eq!(BodyLabel::parse("Disk"), BodyLabel::Other);
    }

    #[test]
    fn test_bucket_contact_either_order() {
        let p = pair(body(1, "disk"), body(2, "bucket-7"));
        assert_eq!(
            classify(&p),
            Some(Contact::DiskBucket {
                disk: &p.a,
                bucket: Some(7)
            })
        );

        let p = pair(body(2, "bucket-7"), body(1, "disk"));
        match classify(&p) {
            Some(Contact::DiskBucket { disk, bucket }) => {
                assert_eq!(disk.handle, BodyHandle(1));
                assert_eq!(bucket, Some(7));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_peg_contact_either_order() {
        let p = pair(body(3, "peg"), body(1, "disk"));
        match classify(&p) {
            Some(Contact::DiskPeg { disk, peg, support }) => {
                assert_eq!(disk.handle, BodyHandle(1));
                assert_eq!(peg.handle, BodyHandle(3));
                assert_eq!(support, Vec2::new(1.0, 2.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_disk_pair() {
        let p = pair(body(1, "disk"), body(5, "disk"));
        assert!(matches!(classify(&p), Some(Contact::DiskDisk { .. })));
    }

    #[test]
    fn test_ignored_pairs() {
        for (a, b) in [
            ("disk", "wall"),
            ("disk", "divider"),
            ("peg", "bucket-1"),
            ("peg", "peg"),
            ("wall", "bucket-2"),
            ("", ""),
        ] {
            assert_eq!(classify(&pair(body(1, a), body(2, b))), None, "{a} / {b}");
        }
    }
}

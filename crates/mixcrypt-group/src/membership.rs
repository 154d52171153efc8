//! Group membership and its digest
//!
//! A membership is the leader followed by 2–10 participants sorted by raw ID
//! bytes. The digest commits to every member's ID and DH key in that order, so
//! it does not depend on the order participants were supplied in.

use mixcrypt_core::{CryptoError, CryptoResult, Id};
use mixcrypt_crypto::{hash_parts, LargeInt, HASH_LEN};

pub const MIN_PARTICIPANTS: usize = 2;
pub const MAX_PARTICIPANTS: usize = 10;

/// A group member. The DH key may be unknown (e.g. before the request is accepted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: Id,
    pub dh_key: Option<LargeInt>,
}

impl Member {
    pub fn new(id: Id, dh_key: LargeInt) -> Self {
        Self {
            id,
            dh_key: Some(dh_key),
        }
    }

    /// The DH key bytes, empty if unknown.
    pub fn dh_key_bytes(&self) -> Vec<u8> {
        self.dh_key.as_ref().map(LargeInt::bytes).unwrap_or_default()
    }
}

/// Leader at position 0, participants sorted ascending after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership(Vec<Member>);

impl Membership {
    pub fn new(leader: Member, participants: &[Member]) -> CryptoResult<Self> {
        if participants.len() < MIN_PARTICIPANTS {
            return Err(CryptoError::TooFewMembers {
                got: participants.len(),
                min: MIN_PARTICIPANTS,
            });
        }
        if participants.len() > MAX_PARTICIPANTS {
            return Err(CryptoError::TooManyMembers {
                got: participants.len(),
                max: MAX_PARTICIPANTS,
            });
        }

        let mut sorted = participants.to_vec();
        sorted.sort_by(|a, b| a.id.as_bytes().cmp(b.id.as_bytes()));

        for pair in sorted.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(CryptoError::DuplicateMember(pair[0].id));
            }
        }
        if let Some(dup) = sorted.iter().find(|m| m.id == leader.id) {
            return Err(CryptoError::DuplicateMember(dup.id));
        }

        let mut members = Vec::with_capacity(sorted.len() + 1);
        members.push(leader);
        members.extend(sorted);
        tracing::debug!(members = members.len(), "membership created");
        Ok(Self(members))
    }

    /// Rebuild from a serialised member list, checking every invariant again.
    pub fn from_members(members: &[Member]) -> CryptoResult<Self> {
        let Some((leader, participants)) = members.split_first() else {
            return Err(CryptoError::TooFewMembers {
                got: 0,
                min: MIN_PARTICIPANTS,
            });
        };
        Self::new(leader.clone(), participants)
    }

    pub fn leader(&self) -> &Member {
        &self.0[0]
    }

    pub fn participants(&self) -> &[Member] {
        &self.0[1..]
    }

    pub fn members(&self) -> &[Member] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: &Id) -> Option<&Member> {
        self.0.iter().find(|m| m.id == *id)
    }

    /// `H(m0.id ‖ m0.dh ‖ m1.id ‖ m1.dh ‖ …)`; unknown DH keys add nothing.
    pub fn digest(&self) -> [u8; HASH_LEN] {
        let dh: Vec<Vec<u8>> = self.0.iter().map(Member::dh_key_bytes).collect();
        let mut parts: Vec<&[u8]> = Vec::with_capacity(self.0.len() * 2);
        for (member, key) in self.0.iter().zip(&dh) {
            parts.push(member.id.as_bytes());
            parts.push(key);
        }
        hash_parts(&parts)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use mixcrypt_core::IdType;

    pub fn member(tag: u8) -> Member {
        Member::new(
            Id::new([tag; 32], IdType::User),
            LargeInt::from_u64(1000 + u64::from(tag)),
        )
    }
}

//! Room membership table.
//!
//! One [`Member`] record per identity per room. Records are created the first
//! time an identity posts or touches presence, updated in place afterwards and
//! never removed: leaving is presence = offline.

use serde::Serialize;
use std::collections::HashMap;

/// A member's standing in the syndicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    #[default]
    Member,
}

/// Per-room participant record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub identity: String,
    pub short: String,
    pub role: Role,
    pub online: bool,
    /// Milliseconds since the Unix epoch.
    pub joined_at: i64,
    pub contributed_tickets: u64,
    /// Insertion order within the room, used as the final sort tiebreak.
    #[serde(skip)]
    seq: u64,
}

/// Online / total member counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberCounts {
    pub online: usize,
    pub total: usize,
}

/// Shorten an identity for display: `0x1234...abcd`.
///
/// Identities of 10 characters or fewer are returned unchanged.
pub fn shorten_identity(identity: &str) -> String {
    let chars: Vec<char> = identity.chars().collect();
    if chars.len() <= 10 {
        return identity.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Identity -> member mapping for one room.
#[derive(Debug, Default)]
pub struct MembershipTable {
    members: HashMap<String, Member>,
    next_seq: u64,
}

impl MembershipTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identity: &str) -> Option<&Member> {
        self.members.get(identity)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Find-or-create. The returned flag is `true` when the record is new.
    fn entry_or_create(&mut self, identity: &str, online: bool, now: i64) -> (&mut Member, bool) {
        let next_seq = &mut self.next_seq;
        let mut created = false;
        let member = self
            .members
            .entry(identity.to_string())
            .or_insert_with(|| {
                created = true;
                let seq = *next_seq;
                *next_seq += 1;
                Member {
                    identity: identity.to_string(),
                    short: shorten_identity(identity),
                    role: Role::Member,
                    online,
                    joined_at: now,
                    contributed_tickets: 0,
                    seq,
                }
            });
        (member, created)
    }

    /// Create an online `member` record for a first-time poster, or return the
    /// existing record unchanged.
    pub fn upsert_on_post(&mut self, identity: &str, now: i64) -> (Member, bool) {
        let (member, created) = self.entry_or_create(identity, true, now);
        (member.clone(), created)
    }

    pub fn set_presence(&mut self, identity: &str, online: bool, now: i64) -> Member {
        let (member, _) = self.entry_or_create(identity, online, now);
        member.online = online;
        member.clone()
    }

    pub fn set_role(&mut self, identity: &str, role: Role, now: i64) -> Member {
        let (member, _) = self.entry_or_create(identity, false, now);
        member.role = role;
        member.clone()
    }

    pub fn add_contribution(&mut self, identity: &str, tickets: u64, now: i64) -> Member {
        let (member, _) = self.entry_or_create(identity, false, now);
        member.contributed_tickets = member.contributed_tickets.saturating_add(tickets);
        member.clone()
    }

    /// Managers first (in join order), then everyone else by contributed
    /// tickets descending, ties in join order.
    pub fn list(&self, online_only: bool) -> Vec<Member> {
        let mut out: Vec<Member> = self
            .members
            .values()
            .filter(|m| !online_only || m.online)
            .cloned()
            .collect();

        out.sort_by(|a, b| {
            let a_mgr = a.role == Role::Manager;
            let b_mgr = b.role == Role::Manager;
            b_mgr
                .cmp(&a_mgr)
                .then_with(|| {
                    if a_mgr {
                        std::cmp::Ordering::Equal
                    } else {
                        b.contributed_tickets.cmp(&a.contributed_tickets)
                    }
                })
                .then_with(|| a.seq.cmp(&b.seq))
        });
        out
    }

    pub fn counts(&self) -> MemberCounts {
        MemberCounts {
            online: self.members.values().filter(|m| m.online).count(),
            total: self.members.len(),
        }
    }
}

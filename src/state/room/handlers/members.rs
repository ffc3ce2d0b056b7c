//! Membership mutations and listing.

use crate::state::member::{Member, Role};
use crate::state::notifier::RoomEvent;
use crate::state::room::{MemberList, RoomActor, now_ms};
use tracing::debug;

impl RoomActor {
    pub(crate) fn handle_set_presence(&mut self, identity: &str, online: bool) -> Member {
        let member = self.members.set_presence(identity, online, now_ms());
        debug!(room = %self.id, identity = %identity, online, "presence updated");

        self.publish(RoomEvent::MemberStatus(member.clone()));
        self.publish(RoomEvent::MembersUpdated(self.members.counts()));
        member
    }

    pub(crate) fn handle_set_role(&mut self, identity: &str, role: Role) -> Member {
        let member = self.members.set_role(identity, role, now_ms());
        debug!(room = %self.id, identity = %identity, ?role, "role updated");

        self.publish(RoomEvent::MembersUpdated(self.members.counts()));
        member
    }

    pub(crate) fn handle_add_contribution(&mut self, identity: &str, tickets: u64) -> Member {
        let member = self.members.add_contribution(identity, tickets, now_ms());
        debug!(
            room = %self.id,
            identity = %identity,
            tickets,
            total = member.contributed_tickets,
            "contribution recorded"
        );

        self.publish(RoomEvent::MembersUpdated(self.members.counts()));
        member
    }

    pub(crate) fn member_list(&self, online_only: bool) -> MemberList {
        let counts = self.members.counts();
        MemberList {
            members: self.members.list(online_only),
            online_count: counts.online,
            total_count: counts.total,
        }
    }
}

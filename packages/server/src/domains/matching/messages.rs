//! Direct-message texts sent to participants.
//!
//! Slack mrkdwn: `<@U123>` renders as a mention, `_x_` as italics.

use crate::common::ParticipantId;
use crate::domains::matching::models::Group;

pub fn pair_intro(partner: &ParticipantId, reason: Option<&str>) -> String {
    let mut text = format!(
        ":coffee: Your coffee chat partner this round is <@{}>! \
         Say hi and find a time that works for both of you.",
        partner
    );
    if let Some(reason) = reason {
        text.push_str("\n_Why you two:_ ");
        text.push_str(reason);
    }
    text
}

pub fn no_partner() -> String {
    "We had an odd number of people this round, so you don't have a coffee chat \
     partner this time. Opt in again for the next round and we'll find you one."
        .to_string()
}

pub fn profile_saved() -> String {
    "Your coffee chat profile has been saved! Opt in to the next round whenever you're ready."
        .to_string()
}

pub fn opted_in() -> String {
    "You're in for the next coffee chat round. We'll message you when pairs are drawn."
        .to_string()
}

/// Messages owed to the members of one group: one per member
pub fn for_group(group: &Group) -> Vec<(ParticipantId, String)> {
    match group {
        Group::Pair { a, b, reason } => vec![
            (a.clone(), pair_intro(b, reason.as_deref())),
            (b.clone(), pair_intro(a, reason.as_deref())),
        ],
        Group::Singleton { id } => vec![(id.clone(), no_partner())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_messages_name_the_other_person() {
        let group = Group::Pair {
            a: "UA".into(),
            b: "UB".into(),
            reason: Some("Both of you brew pour-over.".to_string()),
        };

        let messages = for_group(&group);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].0.as_str(), "UA");
        assert!(messages[0].1.contains("<@UB>"));
        assert!(messages[0].1.contains("pour-over"));
        assert_eq!(messages[1].0.as_str(), "UB");
        assert!(messages[1].1.contains("<@UA>"));
    }

    #[test]
    fn test_pair_without_reason_has_no_reason_line() {
        let text = pair_intro(&"UB".into(), None);
        assert!(!text.contains("Why you two"));
    }

    #[test]
    fn test_singleton_gets_no_partner_message() {
        let messages = for_group(&Group::Singleton { id: "UC".into() });

        assert_eq!(messages, vec![(ParticipantId::from("UC"), no_partner())]);
    }
}

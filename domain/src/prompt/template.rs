//! Prompt templates for conversation turns and digestion

use crate::agent::entities::Agent;
use crate::core::END_OF_CONVERSATION;
use crate::scheduling::context::PromptContext;

/// Transcript stand-in before the first exchange of a conversation.
pub const NO_CONVERSATION_YET: &str = "No conversation has occurred yet.";

/// Insight stand-in when nothing is remembered about a partner, and the
/// digest returned for degenerate digestion input.
pub const NO_PREVIOUS_MEMORY: &str = "no previous memory";

/// Utterance recorded when the model could not produce a reply.
pub const DEGRADED_PLACEHOLDER: &str = "[no response: the model was unavailable for this turn]";

/// First line of every digestion prompt.
pub const DIGEST_PREAMBLE: &str = "You keep concise notes about the people you meet.";

/// Inputs for a single conversation turn.
#[derive(Debug, Clone)]
pub struct TurnPrompt<'a> {
    pub speaker: &'a Agent,
    pub listener: &'a str,
    /// Rendered short-term transcript; empty before the first exchange.
    pub transcript: &'a str,
    /// Long-term insight the speaker holds about the listener.
    pub insight: Option<&'a str>,
    /// Unfilled bingo clues the speaker is trying to complete.
    pub open_goals: &'a [String],
    pub context: &'a PromptContext,
}

/// Templates for generating prompts
pub struct PromptTemplate;

impl PromptTemplate {
    /// Prompt for the next utterance of `speaker` in a conversation.
    pub fn conversation_turn(turn: &TurnPrompt<'_>) -> String {
        let ctx = turn.context;
        let transcript = if turn.transcript.trim().is_empty() {
            NO_CONVERSATION_YET
        } else {
            turn.transcript
        };
        let insight = turn
            .insight
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(NO_PREVIOUS_MEMORY);

        let mut prompt = format!(
            r#"You are {name}. Stay in character at all times.

Your personality:
{personality}

You are at a social mixer talking with {other}.

What you remember about {other} from earlier conversations:
{insight}

Conversation so far:
{transcript}
"#,
            name = turn.speaker.name(),
            personality = turn.speaker.personality(),
            other = turn.listener,
        );

        if !turn.open_goals.is_empty() {
            prompt.push_str("\nThings you are hoping to find out or talk about today:\n");
            for goal in turn.open_goals {
                prompt.push_str(&format!("- {}\n", goal));
            }
        }

        prompt.push_str(&format!(
            r#"
Event status:
- Time step {step} of {max_steps}
- Message {next} of at most {max_messages} in this conversation
- You have finished {speaker_done} conversations ({speaker_left} people left to meet); {other} has finished {listener_done} ({listener_left} left)
- {completed} of {total} possible conversations have happened across the event
"#,
            step = ctx.time_step,
            max_steps = ctx.max_time_steps,
            next = ctx.messages_exchanged + 1,
            max_messages = ctx.max_messages,
            speaker_done = ctx.speaker_past_partners.len(),
            speaker_left = ctx.speaker_available_partners,
            other = turn.listener,
            listener_done = ctx.listener_past_partners.len(),
            listener_left = ctx.listener_available_partners,
            completed = ctx.completed_conversations,
            total = ctx.total_possible_conversations,
        ));

        if let Some(round) = ctx.round {
            prompt.push_str(&format!("- This is round {} of {}\n", round.index, round.total));
        }

        if ctx.is_final_message() {
            prompt.push_str("\nThis is your last message in this conversation, so wrap up politely.\n");
        }

        prompt.push_str(&format!(
            r#"
Reply with a single short conversational message as {name}, addressed to {other}. Do not write {other}'s lines.
If the conversation has run its course, end your message with {sentinel}"#,
            name = turn.speaker.name(),
            other = turn.listener,
            sentinel = END_OF_CONVERSATION,
        ));

        prompt
    }

    /// Prompt folding a finished conversation into an existing digest.
    pub fn digest(previous: &str, history: &str) -> String {
        format!(
            r#"{DIGEST_PREAMBLE}

Your previous notes:
{previous}

The latest conversation:
{history}

Rewrite your notes about this person in a few sentences, keeping anything important from the previous notes and adding what you learned just now. Reply with the notes only."#
        )
    }

    /// Digest used when the digestion call cannot be completed.
    pub fn fallback_digest(exchanges: usize) -> String {
        format!("Conversation summary: {} exchanges have occurred.", exchanges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::context::RoundInfo;

    fn context() -> PromptContext {
        PromptContext {
            time_step: 3,
            max_time_steps: 50,
            messages_exchanged: 4,
            max_messages: 10,
            speaker_past_partners: vec!["carol".to_string()],
            listener_past_partners: vec![],
            speaker_total_conversations: 1,
            listener_total_conversations: 0,
            speaker_available_partners: 2,
            listener_available_partners: 3,
            experiment_complete: false,
            total_possible_conversations: 6,
            completed_conversations: 1,
            round: None,
        }
    }

    #[test]
    fn test_conversation_turn_format() {
        let alice = Agent::new("alice", "A retired sailor who loves knots.");
        let ctx = context();
        let goals = vec!["Find someone who has been to Iceland".to_string()];
        let prompt = PromptTemplate::conversation_turn(&TurnPrompt {
            speaker: &alice,
            listener: "bob",
            transcript: "alice: Hello!\nbob: Hi there.",
            insight: Some("Bob bakes bread."),
            open_goals: &goals,
            context: &ctx,
        });

        assert!(prompt.contains("You are alice"));
        assert!(prompt.contains("A retired sailor who loves knots."));
        assert!(prompt.contains("bob: Hi there."));
        assert!(prompt.contains("Bob bakes bread."));
        assert!(prompt.contains("- Find someone who has been to Iceland"));
        assert!(prompt.contains("Time step 3 of 50"));
        assert!(prompt.contains("Message 5 of at most 10"));
        assert!(prompt.contains("1 of 6 possible conversations"));
        assert!(prompt.contains(END_OF_CONVERSATION));
        assert!(!prompt.contains("last message"));
    }

    #[test]
    fn test_conversation_turn_defaults() {
        let alice = Agent::new("alice", "Curious.");
        let mut ctx = context();
        ctx.messages_exchanged = 9;
        ctx.round = Some(RoundInfo { index: 2, total: 3 });
        let prompt = PromptTemplate::conversation_turn(&TurnPrompt {
            speaker: &alice,
            listener: "bob",
            transcript: "",
            insight: None,
            open_goals: &[],
            context: &ctx,
        });

        assert!(prompt.contains(NO_CONVERSATION_YET));
        assert!(prompt.contains(NO_PREVIOUS_MEMORY));
        assert!(!prompt.contains("hoping to find out"));
        assert!(prompt.contains("round 2 of 3"));
        assert!(prompt.contains("last message"));
    }

    #[test]
    fn test_digest_prompt_format() {
        let prompt = PromptTemplate::digest("Likes tea.", "bob: I also like coffee.");
        assert!(prompt.contains("Likes tea."));
        assert!(prompt.contains("bob: I also like coffee."));
    }

    #[test]
    fn test_fallback_digest() {
        assert_eq!(
            PromptTemplate::fallback_digest(3),
            "Conversation summary: 3 exchanges have occurred."
        );
    }

    #[test]
    fn test_placeholder_does_not_end_conversation() {
        assert!(!crate::core::contains_sentinel(DEGRADED_PLACEHOLDER));
    }
}

//! Reply copy for both conversation flows
//!
//! Everything user-facing lives here so tone edits never touch transition
//! logic. Completion copy is fixed text: it must not interpolate values that
//! depend on persistence, which is best-effort and may have failed.

use super::state::Mood;

pub(crate) const MOOD_MENU: &str = "1. Calm\n2. Stressed\n3. Tempted\n4. Hopeful";

pub(crate) fn welcome() -> String {
    format!("Welcome to Next Moment. This is your daily check-in.\nHow are you feeling right now?\n{MOOD_MENU}")
}

pub(crate) fn invalid_mood(input: &str) -> String {
    format!("Sorry, \"{input}\" isn't one of the options. How are you feeling right now?\n{MOOD_MENU}")
}

fn affirmation(mood: Mood) -> &'static str {
    match mood {
        Mood::Calm => "Calm is worth noticing. You built this.",
        Mood::Stressed => "Stress is a signal, not a verdict. You showed up anyway.",
        Mood::Tempted => "Naming temptation takes it out of the dark. That took courage.",
        Mood::Hopeful => "Hold on to that hope. It's earned.",
    }
}

pub(crate) fn intention_offer(mood: Mood) -> String {
    format!(
        "{} Would you like to set an intention for today? Reply YES or NO.",
        affirmation(mood)
    )
}

pub(crate) const INTENTION_REQUEST: &str =
    "What's your intention for today? A few words is plenty.";

pub(crate) const YES_NO_REPROMPT: &str =
    "Please reply YES to set an intention or NO to finish up.";

pub(crate) const EMPTY_INTENTION_REPROMPT: &str =
    "Take your time. When you're ready, reply with your intention for today.";

pub(crate) const DAILY_COMPLETION: &str =
    "That's today's check-in done. One day at a time. Talk to you tomorrow.";

pub(crate) const REPAIR_OPENING: &str = "You reached out, and that matters. This moment will pass.\nWhen you're ready, tell me what triggered this feeling.";

pub(crate) const REPAIR_EMPTY_REPROMPT: &str =
    "No rush. When you can, tell me what triggered this feeling.";

pub(crate) const REPAIR_COMPLETION: &str = "Thank you for telling me. Reaching out instead of acting on it is the whole practice.\nYour streak is safe. Be gentle with yourself today.";

//! Morning-post prompt assembly.
//!
//! The generated post should read like a person, not a dashboard. The system
//! prompt carries the persona and the style rules, the user prompt carries
//! whatever context the run managed to gather (day, date, market mood,
//! headlines). Context lines are optional: the prompt renders fine with
//! nothing but the date.

use daybreak_signals::MarketSnapshot;
use regex::Regex;

/// Generation defaults used when the variant config does not override them.
pub const DEFAULT_POST_MAX_TOKENS: u32 = 200;
pub const DEFAULT_POST_TEMPERATURE: f32 = 0.9;

pub const DEFAULT_PERSONA: &str =
    "a chill, funny crypto enthusiast who loves AVAX and uses light sarcastic humor";

/// How many fetched headlines actually make it into the prompt.
const PROMPT_HEADLINES: usize = 3;

/// Everything the prompt may mention about the current morning.
#[derive(Debug, Clone)]
pub struct MorningContext {
    /// Weekday name, e.g. "Monday".
    pub day_name: String,
    /// Human date, e.g. "January 5, 2026".
    pub date_line: String,
    pub market: Option<MarketSnapshot>,
    pub headlines: Vec<String>,
    /// Tell the model to lean on its live social search for the reply.
    pub live_search: bool,
}

impl MorningContext {
    /// Context for the current local date, with no signals attached yet.
    pub fn today() -> Self {
        let now = chrono::Local::now();
        Self {
            day_name: now.format("%A").to_string(),
            date_line: now.format("%B %d, %Y").to_string(),
            market: None,
            headlines: Vec::new(),
            live_search: false,
        }
    }
}

/// A persona, a handful of example posts, and the morning's context.
#[derive(Debug, Clone)]
pub struct MorningPrompt {
    pub persona: String,
    pub style_examples: Vec<String>,
    pub context: MorningContext,
}

impl MorningPrompt {
    pub fn new(context: MorningContext) -> Self {
        Self {
            persona: DEFAULT_PERSONA.to_string(),
            style_examples: default_style_examples(),
            context,
        }
    }

    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    /// Replaces the built-in example posts. An empty list keeps the defaults.
    pub fn with_style_examples(mut self, examples: Vec<String>) -> Self {
        if !examples.is_empty() {
            self.style_examples = examples;
        }
        self
    }

    /// Persona plus the style rules and example posts.
    pub fn system_prompt(&self) -> String {
        let examples = self
            .style_examples
            .iter()
            .enumerate()
            .map(|(i, ex)| format!("Example {}:\n\"{}\"", i + 1, ex))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "You are writing a GM (good morning) post for a crypto account on X.\n\
             The account owner is {persona}.\n\
             \n\
             STYLE RULES (VERY IMPORTANT):\n\
             - Start with \"GM\" or \"happy {day}!\" or a similar casual greeting\n\
             - Keep it SHORT: 2-4 sentences max\n\
             - Casual, friendly tone - like talking to friends\n\
             - Sometimes reference the day (Monday vibes, Friday energy, etc.)\n\
             - Light sarcastic humor is good (like comparing crypto to random world events)\n\
             - Can mention the market briefly but don't be too serious about it\n\
             - Sometimes ask simple questions for engagement (\"yey or ney?\", \"who's ready?\")\n\
             - NO hashtags\n\
             - NO emojis (or max 1-2 if really fits)\n\
             - Write in lowercase mostly (casual vibe)\n\
             - End with something relatable or funny\n\
             \n\
             EXAMPLES OF THE STYLE:\n\
             {examples}",
            persona = self.persona,
            day = self.context.day_name,
            examples = examples,
        )
    }

    /// The morning's context plus the output-format instruction.
    pub fn user_prompt(&self) -> String {
        let mut lines = vec![
            format!("- Today is: {}", self.context.day_name),
            format!("- Date: {}", self.context.date_line),
        ];

        if let Some(market) = &self.context.market {
            lines.push(format!(
                "- Market sentiment: {} ({:+.1}% 24h)",
                market.sentiment, market.change_24h
            ));
        }

        let news_summary = if self.context.headlines.is_empty() {
            "No major news today".to_string()
        } else {
            self.context
                .headlines
                .iter()
                .take(PROMPT_HEADLINES)
                .cloned()
                .collect::<Vec<_>>()
                .join("\n")
        };
        lines.push(format!("- Recent news headlines: {news_summary}"));

        if self.context.live_search {
            lines.push(
                "- You have live search over X posts: reference something actually \
                 happening this morning"
                    .to_string(),
            );
        }

        format!(
            "CURRENT CONTEXT:\n\
             {context}\n\
             \n\
             Now write ONE GM post in this exact style. Be creative, maybe reference \
             something current happening in the world (politics, sports, memes) in a \
             funny way. Keep it authentic and casual.\n\
             \n\
             IMPORTANT: Output ONLY the post text, nothing else. No quotes, no explanation.",
            context = lines.join("\n"),
        )
    }
}

pub fn default_style_examples() -> Vec<String> {
    [
        "GM\nwoke up, checked the charts, went back to bed for five more minutes\nwe call that risk management",
        "happy Tuesday!\ncoffee first, charts second, touching grass somewhere in between\nwhat's everyone building today?",
        "GM legends\nmay your coffee be strong and your gas fees low",
        "weekend loading...\nmarket doing its usual sideways crab walk\nyey or ney on a lazy Sunday?",
        "GM\nnew week, same bags\nlet's make it a good one anyway",
        "last trading day of the month!\ngrateful for the green days, learned from the red ones\nhappy Friday, frens!",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Try to extract the inside of a ``` fenced block; fall back to raw.
fn strip_code_fence(text: &str) -> Option<String> {
    let re_fence = Regex::new(r"(?s)^```[A-Za-z0-9_+-]*\s*(.*?)\s*```$").ok()?;
    re_fence
        .captures(text)
        .and_then(|c| c.get(1).map(|m| m.as_str().to_string()))
}

/// Normalize raw model output into postable text.
///
/// Models occasionally wrap the post in a code fence or quotes despite the
/// instructions; both are stripped. Returns an empty string when nothing
/// survives, which callers treat as a failed generation.
pub fn clean_post_text(raw: &str) -> String {
    let mut text = raw.trim().to_string();

    if let Some(inner) = strip_code_fence(&text) {
        text = inner;
    }

    // Peel matching outer quote pairs, possibly nested.
    loop {
        let trimmed = text.trim();
        let stripped = trimmed
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .or_else(|| {
                trimmed
                    .strip_prefix('\'')
                    .and_then(|s| s.strip_suffix('\''))
            });
        match stripped {
            Some(inner) => text = inner.trim().to_string(),
            None => break,
        }
        if text.is_empty() {
            break;
        }
    }

    text.trim().to_string()
}

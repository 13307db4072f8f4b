//! Chat assistant support: the financial context handed to the LLM proxy, the
//! system prompt built from it, and a decoder for the proxy's event stream.

use finwise_core::{Category, FinancialProfile, Transaction};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Expense categories included in the context
pub const RECENT_EXPENSE_CATEGORIES: usize = 10;

/// Snapshot of the user's finances sent along with each chat request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialContext {
    pub has_profile: bool,
    pub overall_health: u8,
    pub savings_rate: f64,
    /// `"unknown"` when there is no profile yet
    pub risk_level: String,
    pub monthly_expenses: f64,
    pub total_transactions: usize,
    pub recent_expense_categories: Vec<Category>,
}

impl FinancialContext {
    /// `transactions` should be newest first, as the store lists them.
    pub fn build(profile: Option<&FinancialProfile>, transactions: &[Transaction]) -> Self {
        Self {
            has_profile: profile.is_some(),
            overall_health: profile.map(|p| p.overall_health_score).unwrap_or(0),
            savings_rate: profile.map(|p| p.savings_rate).unwrap_or(0.0),
            risk_level: profile
                .map(|p| p.risk_level.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            monthly_expenses: profile.map(|p| p.monthly_burn_rate).unwrap_or(0.0),
            total_transactions: transactions.len(),
            recent_expense_categories: transactions
                .iter()
                .filter(|t| t.is_expense())
                .take(RECENT_EXPENSE_CATEGORIES)
                .map(|t| t.category)
                .collect(),
        }
    }
}

const ASSISTANT_INTRO: &str = "You are a friendly and knowledgeable personal finance assistant \
called FinanceWise AI. Your role is to help users understand their finances, provide actionable \
advice, and answer questions about money management.";

const ASSISTANT_GUIDELINES: &str = "\
Guidelines:
- Be encouraging and supportive, especially when discussing financial challenges
- Provide specific, actionable advice based on the user's financial context when available
- Explain financial concepts in simple, easy-to-understand language
- When suggesting improvements, prioritize based on impact (e.g., emergency fund before investing)
- If the user hasn't added transactions yet, encourage them to do so for personalized insights
- Be concise but thorough - aim for helpful responses without being overwhelming
- Use bullet points or numbered lists for multi-step advice
- If asked about something outside your knowledge, be honest about limitations

Remember: You're here to help users feel confident about their financial decisions and guide \
them toward better money habits.";

/// System prompt for the assistant, with the context block when one is given.
/// Numbers are printed as stored, without rounding.
pub fn system_prompt(context: Option<&FinancialContext>) -> String {
    let context_block = match context {
        Some(ctx) => {
            let categories = if ctx.recent_expense_categories.is_empty() {
                "None yet".to_string()
            } else {
                ctx.recent_expense_categories
                    .iter()
                    .map(|c| c.tag())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!(
                "\nCurrent User Financial Context:\n\
                 - Overall Health Score: {}/100\n\
                 - Savings Rate: {}%\n\
                 - Risk Level: {}\n\
                 - Monthly Expenses: ${}\n\
                 - Total Transactions Tracked: {}\n\
                 - Recent Expense Categories: {}\n",
                ctx.overall_health,
                ctx.savings_rate,
                ctx.risk_level,
                ctx.monthly_expenses,
                ctx.total_transactions,
                categories,
            )
        }
        None => String::new(),
    };

    format!("{ASSISTANT_INTRO}\n\n{context_block}\n\n{ASSISTANT_GUIDELINES}")
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Delta(String),
    Completed,
}

/// Incremental decoder for `data: {json}` event streams.
///
/// Bytes may arrive split anywhere; only complete lines are decoded. Lines that
/// are not `data:` lines, or whose JSON does not parse, are skipped.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buf: Vec<u8>,
    reply: String,
    done: bool,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk; returns the events completed by it
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.done {
            return events;
        }
        self.buf.extend_from_slice(chunk);

        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(ev) = self.decode_line(&line) {
                events.push(ev);
            }
            if self.done {
                self.buf.clear();
                break;
            }
        }
        events
    }

    /// Flush a trailing unterminated line and close the stream
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if !self.done && !self.buf.is_empty() {
            let rest = std::mem::take(&mut self.buf);
            let line = String::from_utf8_lossy(&rest);
            if let Some(ev) = self.decode_line(&line) {
                events.push(ev);
            }
        }
        if !self.done {
            self.done = true;
            events.push(StreamEvent::Completed);
        }
        events
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Everything received so far, fragments joined in arrival order
    pub fn reply(&self) -> &str {
        &self.reply
    }

    fn decode_line(&mut self, line: &str) -> Option<StreamEvent> {
        let line = line.trim();
        let data = line.strip_prefix("data:")?.trim();
        if data == "[DONE]" {
            self.done = true;
            return Some(StreamEvent::Completed);
        }

        let v: Value = match serde_json::from_str(data) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "skipping malformed stream fragment");
                return None;
            }
        };
        let content = v
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c0| c0.get("delta"))
            .and_then(|d| d.get("content"))
            .and_then(|c| c.as_str())
            .filter(|c| !c.is_empty())?;

        self.reply.push_str(content);
        Some(StreamEvent::Delta(content.to_string()))
    }
}

/// Decode a complete stream body into the assistant reply
pub fn decode_reply(body: &[u8]) -> String {
    let mut decoder = StreamDecoder::new();
    decoder.push(body);
    decoder.finish();
    decoder.reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use finwise_core::{NewTransaction, RiskLevel};

    fn frag(text: &str) -> String {
        format!("data: {{\"choices\":[{{\"delta\":{{\"content\":{}}}}}]}}\n", serde_json::to_string(text).unwrap())
    }

    #[test]
    fn test_fragments_concatenate_in_order() {
        let body = format!("{}{}\n{}data: [DONE]\n", frag("Hello"), frag(", "), frag("world"));
        assert_eq!(decode_reply(body.as_bytes()), "Hello, world");
    }

    #[test]
    fn test_malformed_fragments_are_skipped() {
        let body = format!(
            "{}data: {{\"choices\":[{{\"delta\"\n: keep-alive\n{}data: {{}}\ndata: [DONE]\n",
            frag("a"),
            frag("b")
        );
        assert_eq!(decode_reply(body.as_bytes()), "ab");
    }

    #[test]
    fn test_split_chunks_and_done_stops_stream() {
        let body = format!("{}{}data: [DONE]\n{}", frag("héllo"), frag(" there"), frag("ignored"));
        let bytes = body.as_bytes();
        let mut decoder = StreamDecoder::new();
        let mut events = Vec::new();
        // one byte at a time splits the multi-byte 'é' too
        for b in bytes {
            events.extend(decoder.push(std::slice::from_ref(b)));
        }
        events.extend(decoder.finish());
        assert_eq!(decoder.reply(), "héllo there");
        assert_eq!(events.last(), Some(&StreamEvent::Completed));
        assert_eq!(events.iter().filter(|e| **e == StreamEvent::Completed).count(), 1);
    }

    #[test]
    fn test_unterminated_last_line_is_flushed() {
        let body = frag("tail");
        let mut decoder = StreamDecoder::new();
        decoder.push(body.trim_end().as_bytes());
        assert_eq!(decoder.reply(), "");
        let events = decoder.finish();
        assert_eq!(events, vec![StreamEvent::Delta("tail".into()), StreamEvent::Completed]);
    }

    #[test]
    fn test_context_without_profile() {
        let ctx = FinancialContext::build(None, &[]);
        assert!(!ctx.has_profile);
        assert_eq!(ctx.risk_level, "unknown");
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["recentExpenseCategories"], serde_json::json!([]));
        assert_eq!(json["hasProfile"], serde_json::json!(false));
        assert!(system_prompt(Some(&ctx)).contains("Recent Expense Categories: None yet"));
        assert!(!system_prompt(None).contains("Current User Financial Context"));
    }

    #[test]
    fn test_context_takes_first_ten_expenses() {
        let d = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut txns = vec![
            NewTransaction::new(3000.0, "pay", Category::Salary, d).into_transaction("i", Utc::now()),
        ];
        for i in 0..12 {
            let c = if i == 0 { Category::Rent } else { Category::Food };
            txns.push(NewTransaction::new(10.0, "x", c, d).into_transaction(format!("e{i}"), Utc::now()));
        }
        let mut profile = FinancialProfile::empty("u");
        profile.overall_health_score = 72;
        profile.risk_level = RiskLevel::Moderate;

        let ctx = FinancialContext::build(Some(&profile), &txns);
        assert_eq!(ctx.total_transactions, 13);
        assert_eq!(ctx.recent_expense_categories.len(), 10);
        assert_eq!(ctx.recent_expense_categories[0], Category::Rent);
        assert_eq!(ctx.risk_level, "moderate");
        assert!(system_prompt(Some(&ctx)).contains("Overall Health Score: 72/100"));
    }

    #[test]
    fn test_prompt_prints_values_unrounded() {
        let mut profile = FinancialProfile::empty("u");
        profile.monthly_burn_rate = 1666.6666666666667;
        profile.savings_rate = 16.67;
        let prompt = system_prompt(Some(&FinancialContext::build(Some(&profile), &[])));
        assert!(prompt.starts_with("You are a friendly and knowledgeable personal finance assistant called FinanceWise AI."));
        assert!(prompt.contains("- Monthly Expenses: $1666.6666666666667\n"));
        assert!(prompt.contains("- Savings Rate: 16.67%\n"));
        assert!(prompt.contains("- Risk Level: conservative\n"));
        assert!(prompt.ends_with("guide them toward better money habits."));
    }

    #[test]
    fn test_unscored_profile_still_counts_as_profile() {
        let profile = FinancialProfile::empty("u");
        assert!(profile.last_calculated_at.is_none());
        let ctx = FinancialContext::build(Some(&profile), &[]);
        assert!(ctx.has_profile);
        assert_eq!(ctx.risk_level, "conservative");
    }
}

/// Default instructions for the events agent.
///
/// Small models guess today's date unless told to look it up, which breaks
/// every relative range ("this weekend", "next Friday").
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that can use tools to answer questions.

When working with dates:
1. First use get_current_datetime to find today's date
2. Calculate the date range needed (e.g., \"this weekend\" means Saturday and Sunday)
3. Format dates as YYYY-MM-DDTHH:MM:SS (e.g., \"2026-02-07T00:00:00\")
4. Then call nh_events with the correct start_date and end_date

Important: Always get the current date first before calculating date ranges.";

pub const DEFAULT_QUESTION: &str = "what events are there this weekend?";

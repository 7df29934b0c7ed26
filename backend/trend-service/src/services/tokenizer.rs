/// Tokenizer & Filter
///
/// Splits post titles into candidate terms and applies the admission
/// policy. Pure and deterministic: no I/O, no hidden state. The scoring
/// sets below are the audited configuration for the TW-equities domain;
/// behavior changes happen here, not inline in the pipeline.
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Company / ETF / macro-event whitelist. A token is only admitted when it
/// matches one of these in either substring direction (or sits on the
/// unconditional ALLOWLIST below).
pub const WHITELIST: &[&str] = &[
    // 公司/個股
    "台積電", "聯發科", "鴻海", "廣達", "緯創", "技嘉", "英業達", "仁寶", "華碩", "宏碁",
    "創意", "世芯", "聯詠", "聯電", "日月光", "南亞科", "台達電", "瑞昱", "臺灣高鐵",
    "台泥", "亞泥", "長榮", "陽明", "萬海", "中鋼", "大立光", "國巨", "欣興", "南電", "景碩",
    "鴻準", "統一", "台灣大", "中華電", "遠傳", "緯穎", "微星", "台光電", "聯嘉",
    "鴻華先進", "廣運", "力積電", "世界先進", "台表科", "台耀", "中美晶", "穩懋", "矽力", "矽格",
    // ETF
    "0050", "0056", "006208", "00878", "00929", "00940", "00939",
    // 事件／指標／產業詞
    "降息", "升息", "通膨", "聯準會", "FED", "外資", "投信", "自營商",
    "融資", "融券", "除權息", "除息", "財報", "營收", "法說", "庫藏股", "合併", "重組",
    "AI", "AI伺服器", "生成式AI", "車用電子", "半導體", "矽光子", "封測", "資料中心",
];

/// Well-known tickers admitted unconditionally, ahead of every other
/// predicate. ETF codes are purely numeric and would otherwise be dropped
/// by the numeric filter.
pub const ALLOWLIST: &[&str] = &[
    "台積電", "聯發科", "鴻海", "台達電", "0050", "0056", "00878", "2330",
];

/// Forum boilerplate tags and meta-discussion words.
pub const STOPWORDS: &[&str] = &[
    "Re", "RE", "[情報]", "[新聞]", "[討論]", "[請益]", "[心得]", "問", "爆", "標題", "公告",
    "閒聊", "盤後", "心得", "求", "轉", "分享", "問卦", "心得文", "盤中", "盤勢", "持股",
    "散戶", "老師", "YT", "直播",
];

/// Broad words that match everything and rank nothing useful.
pub const GENERIC_DENYLIST: &[&str] = &[
    "今天", "昨天", "明天", "大家", "問題", "請問", "新聞", "影片", "台股", "股票", "盤勢",
    "大盤", "股市", "散戶", "老師", "操作", "紀錄", "分享", "分析", "整理",
];

/// Dedup-key truncation bound, in code points.
pub const KEY_MAX_CHARS: usize = 12;

/// Minimum admissible token length, in code points.
pub const MIN_TOKEN_CHARS: usize = 2;

/// Punctuation, brackets and dashes (full-width variants included) that
/// separate tokens within a title. Periods are not delimiters: dotted
/// tickers like 00878.TW must stay whole instead of shredding into a bare
/// numeric piece.
const DELIMITERS: &[char] = &[
    '/', '|', '[', ']', '(', ')', '【', '】', '「', '」', '《', '》', '（', '）', '-', '—', '–',
    '_', ',', '，', '!', '！', '?', '？', ':', '：', ';', '；', '、',
];

static STOPWORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOPWORDS.iter().copied().collect());

static DENYLIST_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| GENERIC_DENYLIST.iter().copied().collect());

static ALLOWLIST_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ALLOWLIST.iter().copied().collect());

static DATE_UNIT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(年|月|日|點|時|分|秒|%|％)").expect("Invalid date-unit regex"));

static SLASH_DATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2,4}/\d{1,2}(/\d{1,2})?$").expect("Invalid slash-date regex"));

fn is_emoji(c: char) -> bool {
    matches!(c, '\u{1F300}'..='\u{1F6FF}')
}

/// Split a title into raw token candidates: emoji stripped, whitespace
/// collapsed, delimiter-separated, trimmed, empties dropped.
pub fn tokenize(fragment: &str) -> Vec<String> {
    let cleaned: String = fragment.chars().filter(|c| !is_emoji(*c)).collect();

    cleaned
        .split(|c: char| c.is_whitespace() || DELIMITERS.contains(&c))
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// The admission policy. Every predicate must pass, except that ALLOWLIST
/// membership short-circuits the whole chain.
pub fn is_admissible(token: &str) -> bool {
    if ALLOWLIST_SET.contains(token) {
        return true;
    }

    if token.chars().count() < MIN_TOKEN_CHARS {
        return false;
    }

    if STOPWORD_SET.contains(token) {
        return false;
    }

    if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    if DATE_UNIT_REGEX.is_match(token) || SLASH_DATE_REGEX.is_match(token) {
        return false;
    }

    if DENYLIST_SET.contains(token) {
        return false;
    }

    WHITELIST
        .iter()
        .any(|entry| token.contains(entry) || entry.contains(token))
}

/// Normalized dedup key: near-duplicate long matches merge under the same
/// truncated key.
pub fn normalize_key(token: &str) -> String {
    token.chars().take(KEY_MAX_CHARS).collect()
}

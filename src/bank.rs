// 🏦 Bank catalogue - the closed set of banks and face values
//
// Sub-entries store the bank as a plain string so that records written with
// an unknown name still load. Everything that aggregates goes through
// `Bank::from_name` and skips names it does not recognise.

use serde::Serialize;
use std::fmt;

/// Face values a sub-entry may carry
pub const FACE_VALUES: [i64; 6] = [0, 10, 20, 50, 100, 200];

pub const BANK_COUNT: usize = 8;

// ============================================================================
// BANK
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Bank {
    #[serde(rename = "中國銀行")]
    BankOfChina,

    #[serde(rename = "大豐銀行")]
    TaiFung,

    #[serde(rename = "廣發銀行")]
    Guangfa,

    #[serde(rename = "工商銀行")]
    Icbc,

    #[serde(rename = "Mpay")]
    Mpay,

    #[serde(rename = "支付寶")]
    Alipay,

    #[serde(rename = "UEPAY")]
    Uepay,

    #[serde(rename = "國際銀行")]
    LusoInternational,
}

impl Bank {
    /// Every known bank, in the order pages and summaries list them
    pub const ALL: [Bank; BANK_COUNT] = [
        Bank::BankOfChina,
        Bank::TaiFung,
        Bank::Guangfa,
        Bank::Icbc,
        Bank::Mpay,
        Bank::Alipay,
        Bank::Uepay,
        Bank::LusoInternational,
    ];

    /// Display name, identical to the name stored in sub-entries
    pub fn as_str(&self) -> &'static str {
        match self {
            Bank::BankOfChina => "中國銀行",
            Bank::TaiFung => "大豐銀行",
            Bank::Guangfa => "廣發銀行",
            Bank::Icbc => "工商銀行",
            Bank::Mpay => "Mpay",
            Bank::Alipay => "支付寶",
            Bank::Uepay => "UEPAY",
            Bank::LusoInternational => "國際銀行",
        }
    }

    /// Exact lookup by stored name. Returns None for unknown banks.
    pub fn from_name(name: &str) -> Option<Bank> {
        Bank::ALL.iter().copied().find(|bank| bank.as_str() == name)
    }

    /// Position in `Bank::ALL`
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_face_value(value: i64) -> bool {
    FACE_VALUES.contains(&value)
}

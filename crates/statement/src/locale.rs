use chrono::{DateTime, Utc};

use rogerbank_ledger::TransactionKind;

/// Statement language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    PtBr,
    En,
}

impl Locale {
    pub fn title(&self) -> &'static str {
        match self {
            Locale::PtBr => "Extrato Bancário",
            Locale::En => "Bank Statement",
        }
    }

    pub fn user_label(&self) -> &'static str {
        match self {
            Locale::PtBr => "Usuário",
            Locale::En => "User",
        }
    }

    pub fn balance_label(&self) -> &'static str {
        match self {
            Locale::PtBr => "Saldo atual",
            Locale::En => "Current balance",
        }
    }

    pub fn history_label(&self) -> &'static str {
        match self {
            Locale::PtBr => "Últimas transações:",
            Locale::En => "Latest transactions:",
        }
    }

    pub fn date_label(&self) -> &'static str {
        match self {
            Locale::PtBr => "Data",
            Locale::En => "Date",
        }
    }

    pub fn kind_label(&self, kind: TransactionKind) -> &'static str {
        match (self, kind) {
            (Locale::PtBr, TransactionKind::Deposit) => "Depósito",
            (Locale::PtBr, TransactionKind::Withdraw) => "Retirada",
            (Locale::En, TransactionKind::Deposit) => "Deposit",
            (Locale::En, TransactionKind::Withdraw) => "Withdrawal",
        }
    }

    pub fn format_timestamp(&self, at: DateTime<Utc>) -> String {
        match self {
            Locale::PtBr => at.format("%d/%m/%Y %H:%M:%S").to_string(),
            Locale::En => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        }
    }
}

impl core::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pt-br" | "pt_br" | "pt" => Ok(Locale::PtBr),
            "en" | "en-us" | "en_us" => Ok(Locale::En),
            other => Err(format!("unsupported statement locale '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_common_spellings() {
        assert_eq!("pt-BR".parse::<Locale>(), Ok(Locale::PtBr));
        assert_eq!(" EN ".parse::<Locale>(), Ok(Locale::En));
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn formats_dates_per_locale() {
        let at = Utc.with_ymd_and_hms(2025, 3, 7, 14, 5, 9).unwrap();
        assert_eq!(Locale::PtBr.format_timestamp(at), "07/03/2025 14:05:09");
        assert_eq!(Locale::En.format_timestamp(at), "2025-03-07 14:05:09 UTC");
    }
}

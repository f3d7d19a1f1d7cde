/// Transaction kinds handled by the guest cancellation flow.
///
/// The kind is learned from the vendor's free-text `TransactionType`
/// after guest login and selects which endpoints, identifiers and
/// payload shapes the later steps use.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactionKind {
    Hotel,
    Train,
    Bus,
    Flight,
}

impl TransactionKind {
    /// Parse the vendor's label. Unknown labels return `None`; callers
    /// fall back to the hotel endpoints in that case.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "hotel" => Some(Self::Hotel),
            "train" => Some(Self::Train),
            "bus" => Some(Self::Bus),
            "flight" => Some(Self::Flight),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Hotel => "Hotel",
            Self::Train => "Train",
            Self::Bus => "Bus",
            Self::Flight => "Flight",
        }
    }

    /// Booking-details path on the booking-management host. Flight
    /// details live on a different host entirely.
    pub(crate) fn details_path(&self) -> Option<&'static str> {
        match self {
            Self::Hotel => Some("/Hotels/BookingDetails"),
            Self::Train => Some("/Train/BookingDetail/"),
            Self::Bus => Some("/Bus/BookingDetails/"),
            Self::Flight => None,
        }
    }

    /// Cancellation-OTP path on the booking-management host.
    pub(crate) fn otp_path(&self) -> Option<&'static str> {
        match self {
            Self::Hotel => Some("/Hotels/CancellationOtp"),
            Self::Train => Some("/Train/CancellationOtp/"),
            Self::Bus => Some("/Bus/CancellationOtp/"),
            Self::Flight => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for kind in [
            TransactionKind::Hotel,
            TransactionKind::Train,
            TransactionKind::Bus,
            TransactionKind::Flight,
        ] {
            assert_eq!(TransactionKind::from_label(kind.label()), Some(kind));
        }
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(
            TransactionKind::from_label(" hotel "),
            Some(TransactionKind::Hotel)
        );
        assert_eq!(TransactionKind::from_label("TRAIN"), Some(TransactionKind::Train));
        assert_eq!(TransactionKind::from_label("Cab"), None);
    }
}

// 6.0.2: error type for facade operations. remote failures are wrapped, never rewritten.

use crate::transport::TransportError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum MarginError {
    #[error("{method} failed: {source}")]
    Remote {
        method: &'static str,
        #[source]
        source: TransportError,
    },

    #[error("Failed to decode {method} response: {reason}")]
    Decode { method: &'static str, reason: String },

    #[error("Cannot encode {field}: {reason}")]
    Encode { field: &'static str, reason: String },
}

impl MarginError {
    pub(crate) fn remote(method: &'static str, source: TransportError) -> Self {
        MarginError::Remote { method, source }
    }

    pub(crate) fn decode(method: &'static str, err: impl std::fmt::Display) -> Self {
        MarginError::Decode {
            method,
            reason: err.to_string(),
        }
    }

    pub fn is_revert(&self) -> bool {
        matches!(
            self,
            MarginError::Remote {
                source: TransportError::Reverted { .. },
                ..
            }
        )
    }

    pub fn revert_reason(&self) -> Option<&str> {
        match self {
            MarginError::Remote {
                source: TransportError::Reverted { reason, .. },
                ..
            } => Some(reason.as_str()),
            _ => None,
        }
    }

    // the transport error exactly as the remote side reported it
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            MarginError::Remote { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Bytes;

    #[test]
    fn revert_is_preserved() {
        let err = MarginError::remote(
            "openPosition",
            TransportError::Reverted {
                reason: "PositionId already exists".to_string(),
                data: Bytes::new(),
            },
        );
        assert!(err.is_revert());
        assert_eq!(err.revert_reason(), Some("PositionId already exists"));
        assert_eq!(
            err.to_string(),
            "openPosition failed: execution reverted: PositionId already exists"
        );
    }

    #[test]
    fn transport_faults_are_not_reverts() {
        let err = MarginError::remote("getPosition", TransportError::Timeout);
        assert!(!err.is_revert());
        assert_eq!(err.transport_error(), Some(&TransportError::Timeout));

        let decode = MarginError::decode("getPosition", "buffer overrun");
        assert!(decode.transport_error().is_none());
    }
}

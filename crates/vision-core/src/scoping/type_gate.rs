//! Vision type gate
//!
//! A scoped operator may only work with manually-curated CUSTOM visions: the
//! derived types (client-wide, root, group) would silently pull in companies
//! outside their grants. The gate is enforced again at save time, never only
//! at render time.

use crate::domain::VisionType;
use crate::error::DomainError;
use crate::scoping::permission::AccessDecision;

const SCOPED_TYPES: &[VisionType] = &[VisionType::Custom];

/// Vision types the operator may select for a new or retyped vision.
pub fn allowed_vision_types(access: &AccessDecision) -> &'static [VisionType] {
    match access {
        AccessDecision::Full => &VisionType::ALL,
        AccessDecision::Scoped { .. } => SCOPED_TYPES,
    }
}

/// Save-time re-check of the gate.
pub fn ensure_type_allowed(
    access: &AccessDecision,
    vision_type: VisionType,
) -> Result<(), DomainError> {
    if allowed_vision_types(access).contains(&vision_type) {
        Ok(())
    } else {
        Err(DomainError::VisionTypeNotAllowed(vision_type.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_full_access_allows_all_types() {
        assert_eq!(allowed_vision_types(&AccessDecision::Full), &VisionType::ALL);
    }

    #[test]
    fn test_scoped_access_allows_only_custom() {
        let access = AccessDecision::scoped([Uuid::new_v4()]);
        assert_eq!(allowed_vision_types(&access), &[VisionType::Custom]);
    }

    #[test]
    fn test_empty_scope_allows_only_custom() {
        let access = AccessDecision::scoped(std::iter::empty());
        assert_eq!(allowed_vision_types(&access), &[VisionType::Custom]);
    }

    #[test]
    fn test_ensure_type_allowed_rejects_derived_types_for_scoped() {
        let access = AccessDecision::scoped([Uuid::new_v4()]);
        assert!(ensure_type_allowed(&access, VisionType::Custom).is_ok());
        for vision_type in [VisionType::ClientWide, VisionType::RootScoped, VisionType::GroupScoped] {
            let err = ensure_type_allowed(&access, vision_type).unwrap_err();
            assert!(matches!(err, DomainError::VisionTypeNotAllowed(_)));
        }
    }
}

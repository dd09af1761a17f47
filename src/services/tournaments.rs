//! Tournament validation and the attribute-filter query language

use crate::session::models::errors::{RendezvousError, ServerResult};
use crate::session::models::tournaments::{
    SimpleSearchCondition, SimpleSearchObject, SimpleSearchParam,
};
use crate::utils::parsing::tournament_meta::TournamentMetadata;

/// Required length of the attribute array
const ATTRIBUTE_COUNT: usize = 20;
/// Exact length of a community code
const COMMUNITY_CODE_LEN: usize = 12;
/// Upper bound on search page sizes
const MAX_SEARCH_SIZE: u32 = 100;

/// Validates a client-supplied tournament object: the attribute table,
/// then the metadata buffer which must parse. Returns the parsed
/// metadata on success.
pub fn verify_object(obj: &SimpleSearchObject) -> ServerResult<TournamentMetadata> {
    verify_attributes(&obj.attributes)?;
    TournamentMetadata::parse(&obj.metadata).map_err(|_| RendezvousError::InvalidArgument)
}

/// Per-slot constraints on the attribute array
pub fn verify_attributes(attributes: &[u32]) -> ServerResult<()> {
    if attributes.len() != ATTRIBUTE_COUNT {
        return Err(RendezvousError::InvalidArgument);
    }

    let valid = matches!(attributes[0], 1 | 2)
        && attributes[2] <= 5
        && (1..=8).contains(&attributes[3])
        && matches!(attributes[4], 1 | 2)
        && matches!(attributes[5], 1..=3)
        && matches!(attributes[6], 1 | 2)
        && matches!(attributes[7], 1 | 2)
        && (1..=9).contains(&attributes[8])
        && attributes[9] <= 4
        && matches!(attributes[10], 1 | 2)
        && matches!(attributes[11], 1..=4)
        && matches!(attributes[12], 1 | 2)
        && matches!(attributes[13], 1 | 2);

    if !valid {
        return Err(RendezvousError::InvalidArgument);
    }
    Ok(())
}

/// Community codes are exactly twelve ASCII decimal digits
pub fn verify_community_code(code: &str) -> ServerResult<()> {
    if code.len() != COMMUNITY_CODE_LEN || !code.bytes().all(|value| value.is_ascii_digit()) {
        return Err(RendezvousError::InvalidArgument);
    }
    Ok(())
}

pub fn verify_search_param(param: &SimpleSearchParam) -> ServerResult<()> {
    if param.community_code.len() > COMMUNITY_CODE_LEN {
        return Err(RendezvousError::InvalidArgument);
    }
    if param.range.size > MAX_SEARCH_SIZE {
        return Err(RendezvousError::InvalidArgument);
    }
    Ok(())
}

/// Comparison selected by a condition operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Lt,
    Ge,
    Le,
}

/// A compiled condition over one attribute slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeFilter {
    pub slot: usize,
    pub op: FilterOp,
    pub value: u32,
}

impl AttributeFilter {
    fn matches(&self, attributes: &[u32]) -> bool {
        let actual = attributes.get(self.slot).copied().unwrap_or_default();
        match self.op {
            FilterOp::Eq => actual == self.value,
            FilterOp::Gt => actual > self.value,
            FilterOp::Lt => actual < self.value,
            FilterOp::Ge => actual >= self.value,
            FilterOp::Le => actual <= self.value,
        }
    }
}

/// Compiles the positional condition list into attribute filters.
/// Operator zero ignores the slot; anything above five is rejected.
pub fn compile_conditions(
    conditions: &[SimpleSearchCondition],
) -> ServerResult<Vec<AttributeFilter>> {
    let mut filters = Vec::new();
    for (slot, condition) in conditions.iter().enumerate() {
        let op = match condition.operator {
            0 => continue,
            1 => FilterOp::Eq,
            2 => FilterOp::Gt,
            3 => FilterOp::Lt,
            4 => FilterOp::Ge,
            5 => FilterOp::Le,
            _ => return Err(RendezvousError::InvalidArgument),
        };
        filters.push(AttributeFilter {
            slot,
            op,
            value: condition.value,
        });
    }
    Ok(filters)
}

/// Conjunction of all compiled filters
pub fn matches_filters(attributes: &[u32], filters: &[AttributeFilter]) -> bool {
    filters.iter().all(|filter| filter.matches(attributes))
}

/// A fully valid attribute array, for use in tests across the crate
#[cfg(test)]
pub(crate) fn valid_attributes() -> Vec<u32> {
    let mut attributes = vec![0u32; 20];
    attributes[0] = 1;
    attributes[2] = 3;
    attributes[3] = 1;
    attributes[4] = 1;
    attributes[5] = 1;
    attributes[6] = 1;
    attributes[7] = 2;
    attributes[8] = 9;
    attributes[9] = 4;
    attributes[10] = 1;
    attributes[11] = 4;
    attributes[12] = 1;
    attributes[13] = 1;
    attributes
}

#[cfg(test)]
mod test {
    use super::{
        compile_conditions, matches_filters, valid_attributes, verify_attributes,
        verify_community_code, verify_object, FilterOp,
    };
    use crate::session::models::errors::RendezvousError;
    use crate::session::models::tournaments::{
        SimpleSearchCondition, SimpleSearchDateTimeAttribute, SimpleSearchObject,
    };
    use crate::utils::parsing::tournament_meta::sample_metadata;

    #[test]
    fn test_valid_attributes_pass() {
        assert!(verify_attributes(&valid_attributes()).is_ok());
    }

    #[test]
    fn test_wrong_length_fails() {
        assert!(verify_attributes(&valid_attributes()[..19]).is_err());
        let mut long = valid_attributes();
        long.push(0);
        assert!(verify_attributes(&long).is_err());
    }

    #[test]
    fn test_each_slot_constraint() {
        // (slot, bad value, good value)
        let cases = [
            (0, 0, 1),
            (0, 3, 2),
            (2, 6, 5),
            (3, 0, 8),
            (3, 9, 1),
            (4, 3, 2),
            (5, 0, 3),
            (5, 4, 2),
            (6, 0, 2),
            (7, 3, 1),
            (8, 0, 1),
            (8, 10, 9),
            (9, 5, 0),
            (10, 0, 2),
            (11, 0, 1),
            (11, 5, 4),
            (12, 3, 2),
            (13, 0, 2),
        ];

        for (slot, bad, good) in cases {
            let mut attributes = valid_attributes();
            attributes[slot] = bad;
            assert!(
                verify_attributes(&attributes).is_err(),
                "slot {slot} accepted {bad}"
            );
            attributes[slot] = good;
            assert!(
                verify_attributes(&attributes).is_ok(),
                "slot {slot} rejected {good}"
            );
        }
    }

    #[test]
    fn test_community_code_shape() {
        assert!(verify_community_code("123456789012").is_ok());
        assert!(verify_community_code("12345678901").is_err());
        assert!(verify_community_code("1234567890123").is_err());
        assert!(verify_community_code("12345678901a").is_err());
        assert!(verify_community_code("").is_err());
    }

    #[test]
    fn test_object_metadata_must_parse() {
        let mut object = SimpleSearchObject {
            id: 0,
            owner: 0,
            attributes: valid_attributes(),
            metadata: sample_metadata(),
            community_id: 1,
            community_code: "123456789012".to_string(),
            datetime: SimpleSearchDateTimeAttribute::default(),
        };
        assert!(verify_object(&object).is_ok());

        object.metadata[1] = 0;
        assert_eq!(
            verify_object(&object).unwrap_err(),
            RendezvousError::InvalidArgument
        );
    }

    #[test]
    fn test_condition_compilation() {
        let conditions = [
            SimpleSearchCondition { value: 5, operator: 0 },
            SimpleSearchCondition { value: 1, operator: 1 },
            SimpleSearchCondition { value: 3, operator: 4 },
        ];

        let filters = compile_conditions(&conditions).unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].slot, 1);
        assert_eq!(filters[0].op, FilterOp::Eq);
        assert_eq!(filters[1].slot, 2);
        assert_eq!(filters[1].op, FilterOp::Ge);
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let conditions = [SimpleSearchCondition { value: 0, operator: 6 }];
        assert_eq!(
            compile_conditions(&conditions).unwrap_err(),
            RendezvousError::InvalidArgument
        );
    }

    #[test]
    fn test_filter_matching() {
        let conditions = [
            SimpleSearchCondition { value: 1, operator: 1 },
            SimpleSearchCondition { value: 4, operator: 3 },
        ];
        let filters = compile_conditions(&conditions).unwrap();

        assert!(matches_filters(&[1, 3], &filters));
        assert!(!matches_filters(&[1, 4], &filters));
        assert!(!matches_filters(&[2, 3], &filters));
        // Missing slots read as zero
        assert!(matches_filters(&[1], &filters));
    }
}

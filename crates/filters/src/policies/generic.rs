use crate::dedup::drop_duplicates;
use crate::range::drop_empty_rows;
use crate::{DatasetKind, FilterContext, FilterPolicy};
use housefilter_formats::Table;

/// Fallback for datasets of no known kind: drops empty and repeated rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenericPolicy;

impl FilterPolicy for GenericPolicy {
    fn kind(&self) -> DatasetKind {
        DatasetKind::Generic
    }

    fn apply(&self, table: &Table, _ctx: &FilterContext) -> Table {
        drop_duplicates(&drop_empty_rows(table))
    }

    fn describe(&self, _ctx: &FilterContext) -> Vec<String> {
        vec![
            "rows with every cell null dropped".to_string(),
            "duplicate rows dropped, first occurrence kept".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::test_util::{assert_well_behaved, ctx, table};

    #[test]
    fn test_drops_empty_and_duplicate_rows() {
        let input = table("a,b\n1,x\n,\n1,x\n2,\n2,\n");
        let kept = GenericPolicy.apply(&input, &ctx());
        assert_eq!(kept.height(), 2);
    }

    #[test]
    fn test_well_behaved() {
        let input = table("a,b\n1,x\n,\n1,x\n2,\n");
        assert_well_behaved(&GenericPolicy, &input);
    }
}

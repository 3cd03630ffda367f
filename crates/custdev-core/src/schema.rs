/// Arrow layout for flattened survey results, one row per question option.
pub mod results {
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Int64Array, StringArray, UInt64Array};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;

    use crate::aggregate::QuestionResults;
    use crate::error::CoreError;
    use crate::types::Segment;

    /// Column name for a segment's counts: `seg_{id}_{name}`.
    pub fn segment_column_name(segment_id: i64, segment_name: &str) -> String {
        format!("seg_{segment_id}_{segment_name}")
    }

    /// Fixed leading columns followed by one `UInt64` column per segment.
    pub fn flat_results_schema(segments: &[Segment]) -> Schema {
        let mut fields = vec![
            Field::new("question_id", DataType::Int64, false),
            Field::new("question_text", DataType::Utf8, false),
            Field::new("option_id", DataType::Int64, false),
            Field::new("option_text", DataType::Utf8, false),
            Field::new("total", DataType::UInt64, false),
        ];
        fields.extend(
            segments
                .iter()
                .map(|s| Field::new(segment_column_name(s.id, &s.name), DataType::UInt64, false)),
        );
        Schema::new(fields)
    }

    /// One exported row: a question option with its total and per-segment counts.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FlatRow {
        pub question_id: i64,
        pub question_text: String,
        pub option_id: i64,
        pub option_text: String,
        pub total: u64,
        /// `(seg_{id}_{name}, count)` in segment order.
        pub segments: Vec<(String, u64)>,
    }

    /// Flatten aggregated results into one row per question option.
    ///
    /// Segment columns follow `segments` order; a segment missing from an
    /// option's breakdown contributes 0.
    pub fn flatten(aggregated: &[QuestionResults], segments: &[Segment]) -> Vec<FlatRow> {
        aggregated
            .iter()
            .flat_map(|q| {
                q.options.iter().map(move |o| FlatRow {
                    question_id: q.question_id,
                    question_text: q.question_text.clone(),
                    option_id: o.option_id,
                    option_text: o.option_text.clone(),
                    total: o.total,
                    segments: segments
                        .iter()
                        .map(|s| (segment_column_name(s.id, &s.name), o.value_for(s.id)))
                        .collect(),
                })
            })
            .collect()
    }

    /// [`flatten`] as a single RecordBatch with [`flat_results_schema`].
    pub fn flatten_to_batch(
        aggregated: &[QuestionResults],
        segments: &[Segment],
    ) -> Result<RecordBatch, CoreError> {
        let schema = Arc::new(flat_results_schema(segments));
        let rows = flatten(aggregated, segments);

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.question_id))),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.question_text.as_str()),
            )),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.option_id))),
            Arc::new(StringArray::from_iter_values(
                rows.iter().map(|r| r.option_text.as_str()),
            )),
            Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.total))),
        ];
        for i in 0..segments.len() {
            columns.push(Arc::new(UInt64Array::from_iter_values(
                rows.iter().map(|r| r.segments[i].1),
            )));
        }

        Ok(RecordBatch::try_new(schema, columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::results;
    use crate::aggregate::aggregate;
    use crate::types::{AnswerOption, Question, Segment, SimulationResult};
    use arrow::array::{Array, UInt64Array};

    fn fixture() -> (Vec<Question>, Vec<Segment>, Vec<SimulationResult>) {
        let questions = vec![Question {
            id: 10,
            text: "q".into(),
            kind: "multiple-choice".into(),
            options: vec![
                AnswerOption { id: 100, text: "a".into() },
                AnswerOption { id: 101, text: "b".into() },
            ],
        }];
        let segments = vec![
            Segment::new(1, "Студенты", 50, "x"),
            Segment::new(2, "Родители", 50, "y"),
        ];
        let results = vec![
            SimulationResult { question_id: 10, option_id: 100, segment_id: 1, value: 250 },
            SimulationResult { question_id: 10, option_id: 101, segment_id: 2, value: 150 },
        ];
        (questions, segments, results)
    }

    #[test]
    fn schema_has_segment_columns() {
        let (_, segments, _) = fixture();
        let schema = results::flat_results_schema(&segments);
        assert_eq!(schema.fields().len(), 7);
        assert!(schema.field_with_name("seg_1_Студенты").is_ok());
        assert!(schema.field_with_name("seg_2_Родители").is_ok());
    }

    #[test]
    fn batch_has_one_row_per_option() {
        let (questions, segments, raw) = fixture();
        let agg = aggregate(&questions, &segments, &raw);
        let batch = results::flatten_to_batch(&agg, &segments).unwrap();

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 7);

        let totals = batch
            .column_by_name("total")
            .unwrap()
            .as_any()
            .downcast_ref::<UInt64Array>()
            .unwrap();
        assert_eq!(totals.value(0), 250);
        assert_eq!(totals.value(1), 150);

        let parents = batch
            .column_by_name("seg_2_Родители")
            .unwrap()
            .as_any()
            .downcast_ref::<UInt64Array>()
            .unwrap();
        assert_eq!(parents.value(0), 0);
        assert_eq!(parents.value(1), 150);
        assert_eq!(parents.null_count(), 0);
    }

    #[test]
    fn rows_carry_named_segment_counts() {
        let (questions, segments, raw) = fixture();
        let rows = results::flatten(&aggregate(&questions, &segments, &raw), &segments);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].option_text, "a");
        assert_eq!(
            rows[0].segments,
            vec![("seg_1_Студенты".to_string(), 250), ("seg_2_Родители".to_string(), 0)]
        );
        assert_eq!(rows[1].total, 150);
    }

    #[test]
    fn empty_results_give_empty_batch() {
        let batch = results::flatten_to_batch(&[], &[]).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 5);
    }
}

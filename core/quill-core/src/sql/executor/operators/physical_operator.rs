//! Physical Operator Trait — Volcano Execution Model

use crate::error::QuillResult;
use arrow::array::RecordBatch;
use arrow::datatypes::Schema;

/// 물리 연산자 트레이트 — Volcano 실행 모델 (Pull 기반)
pub trait PhysicalOperator: Send {
    /// 출력 스키마 반환
    fn schema(&self) -> &Schema;

    /// 다음 RecordBatch 반환 (None이면 끝)
    ///
    /// Single pass: once `None` is returned every later call returns `None`.
    fn next(&mut self) -> QuillResult<Option<RecordBatch>>;
}

use polysheet_core::CellValue;

/// Join the textual forms of both operands
pub fn concatenate(left: &CellValue, right: &CellValue) -> CellValue {
    for value in [left, right] {
        if let CellValue::Error(e) = value {
            return CellValue::Error(*e);
        }
    }
    CellValue::Text(format!("{}{}", left.as_text(), right.as_text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polysheet_core::CellError;

    #[test]
    fn test_concatenate() {
        assert_eq!(
            concatenate(&CellValue::from("ab"), &CellValue::Number(7.0)),
            CellValue::from("ab7")
        );
        assert_eq!(
            concatenate(&CellValue::Number(2.5), &CellValue::Boolean(false)),
            CellValue::from("2.5FALSE")
        );
        assert_eq!(
            concatenate(&CellValue::Empty, &CellValue::Error(CellError::NotAvailable)),
            CellValue::Error(CellError::NotAvailable)
        );
    }
}

//! Prompt construction for the diagnosis LLM call.
//!
//! The system prompt fixes the assistant's role and the JSON contract the
//! response must follow; the user prompt interpolates the (already
//! sanitized) request fields.

use crate::request::{DiagnosisRequest, Language};

/// Build the system prompt for the given answer language.
#[must_use]
pub fn build_system_prompt(language: Language) -> String {
    let answer_language = match language {
        Language::Vi => "Tiếng Việt",
        Language::En => "English",
        Language::Ko => "한국어",
    };

    format!(
        r#"Bạn là "Mekong Doctor" - chuyên gia tư vấn nông nghiệp về xâm nhập mặn tại Đồng bằng sông Cửu Long, Việt Nam.
Bạn có kiến thức sâu về:
- Ngưỡng chịu mặn của các loại cây trồng
- Biện pháp ứng phó với xâm nhập mặn
- Chính sách hỗ trợ nông dân của Chính phủ Việt Nam
- Kỹ thuật canh tác thích ứng với biến đổi khí hậu

Hãy trả lời dưới dạng JSON với cấu trúc sau:
{{
  "status": "safe" | "warning" | "danger",
  "message": "Thông điệp chính về tình trạng",
  "solutions": ["Giải pháp 1", "Giải pháp 2", ...],
  "policy": "Thông tin về chính sách hỗ trợ nếu có"
}}

Quy tắc đánh giá:
- safe: Độ mặn <= 50% ngưỡng chịu đựng
- warning: Độ mặn từ 50% đến 100% ngưỡng
- danger: Độ mặn vượt quá ngưỡng chịu đựng

Ngôn ngữ trả lời: {answer_language}"#
    )
}

/// Build the user prompt from a validated request.
#[must_use]
pub fn build_user_prompt(request: &DiagnosisRequest) -> String {
    let location = match &request.district {
        Some(district) => format!("{}, {district}", request.province),
        None => request.province.clone(),
    };
    let symptoms = request
        .sanitized_symptoms()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Không có mô tả cụ thể".to_owned());
    let image_note = match request.image_urls.as_ref().map(Vec::len).unwrap_or(0) {
        0 => String::new(),
        n => format!("\n- Có {n} ảnh đính kèm"),
    };

    format!(
        "Thông tin chẩn đoán:\n\
         - Vị trí: {location}\n\
         - Loại cây trồng: {} ({})\n\
         - Ngưỡng chịu mặn: {}g/L\n\
         - Độ mặn đo được: {}g/L\n\
         - Triệu chứng: {symptoms}{image_note}\n\n\
         Hãy phân tích và đưa ra chẩn đoán chi tiết.",
        request.crop_label, request.crop_type, request.threshold, request.salinity_level
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> DiagnosisRequest {
        DiagnosisRequest {
            province: "Bến Tre".to_owned(),
            district: Some("Ba Tri".to_owned()),
            crop_type: "rice".to_owned(),
            crop_label: "Lúa".to_owned(),
            salinity_level: 2.5,
            threshold: 4.0,
            symptoms: Some("lá vàng\x00".to_owned()),
            image_urls: Some(vec!["https://cdn.test/a.jpg".to_owned()]),
            language: Language::Vi,
        }
    }

    #[test]
    fn test_should_state_answer_language_in_system_prompt() {
        assert!(build_system_prompt(Language::Vi).contains("Tiếng Việt"));
        assert!(build_system_prompt(Language::En).contains("English"));
        assert!(build_system_prompt(Language::Ko).contains("한국어"));
    }

    #[test]
    fn test_should_interpolate_request_fields_into_user_prompt() {
        let prompt = build_user_prompt(&request());
        assert!(prompt.contains("Bến Tre, Ba Tri"));
        assert!(prompt.contains("Lúa (rice)"));
        assert!(prompt.contains("4g/L"));
        assert!(prompt.contains("2.5g/L"));
        assert!(prompt.contains("Có 1 ảnh đính kèm"));
    }

    #[test]
    fn test_should_sanitize_symptoms_before_interpolation() {
        let prompt = build_user_prompt(&request());
        assert!(prompt.contains("lá vàng"));
        assert!(!prompt.contains('\x00'));
    }

    #[test]
    fn test_should_note_missing_symptoms() {
        let mut req = request();
        req.symptoms = None;
        req.image_urls = None;
        let prompt = build_user_prompt(&req);
        assert!(prompt.contains("Không có mô tả cụ thể"));
        assert!(!prompt.contains("ảnh đính kèm"));
    }
}

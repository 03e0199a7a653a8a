//! The advisory wire shape and the rule-based fallback.
//!
//! The fallback is a fixed decision tree over the salinity/threshold ratio:
//!
//! ```text
//! ratio <= 0.5  -> safe
//! ratio <= 1.0  -> warning
//! ratio  > 1.0  -> danger
//! ```
//!
//! It produces the same JSON shape the LLM is instructed to return, so the
//! caller cannot tell which path answered.

use serde::{Deserialize, Serialize};

use crate::request::{DiagnosisRequest, Language};

/// Severity of the diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryStatus {
    /// Salinity is within half the crop's tolerance.
    Safe,
    /// Salinity is between half the tolerance and the tolerance itself.
    Warning,
    /// Salinity exceeds the crop's tolerance.
    Danger,
}

/// The advisory returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advisory {
    /// Overall severity.
    pub status: AdvisoryStatus,
    /// Headline message about the crop's condition.
    pub message: String,
    /// Concrete mitigation steps, most urgent first.
    pub solutions: Vec<String>,
    /// Government support policy note, when one applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
}

/// Produce the deterministic fallback advisory for a request.
#[must_use]
pub fn rule_based_advisory(request: &DiagnosisRequest) -> Advisory {
    let salinity = request.salinity_level;
    let threshold = request.threshold;
    let crop = request.crop_label.as_str();
    let lang = request.language;

    // A zero threshold means any measurable salinity is over tolerance.
    let ratio = if threshold > 0.0 {
        salinity / threshold
    } else if salinity > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    if ratio <= 0.5 {
        Advisory {
            status: AdvisoryStatus::Safe,
            message: match lang {
                Language::Vi => {
                    format!("Độ mặn {salinity}g/L nằm trong ngưỡng an toàn cho {crop}.")
                }
                Language::En => {
                    format!("Salinity {salinity}g/L is within safe range for {crop}.")
                }
                Language::Ko => format!("염도 {salinity}g/L은 {crop}에 안전한 범위입니다."),
            },
            solutions: match lang {
                Language::Vi => vec![
                    "Tiếp tục theo dõi độ mặn định kỳ".to_owned(),
                    "Duy trì chế độ tưới tiêu hiện tại".to_owned(),
                ],
                Language::En => vec![
                    "Continue regular salinity monitoring".to_owned(),
                    "Maintain current irrigation regime".to_owned(),
                ],
                Language::Ko => vec![
                    "정기적인 염도 모니터링 계속".to_owned(),
                    "현재 관개 체제 유지".to_owned(),
                ],
            },
            policy: None,
        }
    } else if ratio <= 1.0 {
        Advisory {
            status: AdvisoryStatus::Warning,
            message: match lang {
                Language::Vi => {
                    format!("Độ mặn {salinity}g/L đang ở mức cảnh báo cho {crop}.")
                }
                Language::En => {
                    format!("Salinity {salinity}g/L is at warning level for {crop}.")
                }
                Language::Ko => format!("염도 {salinity}g/L은 {crop}에 경고 수준입니다."),
            },
            solutions: match lang {
                Language::Vi => vec![
                    "Tăng cường trữ nước ngọt".to_owned(),
                    "Hạn chế lấy nước vào lúc triều cường".to_owned(),
                    "Bón thêm vôi để cải thiện đất".to_owned(),
                ],
                Language::En => vec![
                    "Increase freshwater storage".to_owned(),
                    "Limit water intake during high tide".to_owned(),
                    "Apply lime to improve soil".to_owned(),
                ],
                Language::Ko => vec![
                    "담수 저장량 증가".to_owned(),
                    "만조 시 물 섭취 제한".to_owned(),
                    "토양 개선을 위해 석회 적용".to_owned(),
                ],
            },
            policy: Some(match lang {
                Language::Vi => {
                    "Bạn có thể đăng ký hỗ trợ kỹ thuật từ Trạm Khuyến nông địa phương.".to_owned()
                }
                Language::En => {
                    "You can register for technical support from local Agricultural Extension Station."
                        .to_owned()
                }
                Language::Ko => "지역 농업지도소에서 기술 지원을 신청할 수 있습니다.".to_owned(),
            }),
        }
    } else {
        Advisory {
            status: AdvisoryStatus::Danger,
            message: match lang {
                Language::Vi => format!(
                    "CẢNH BÁO: Độ mặn {salinity}g/L vượt ngưỡng chịu đựng của {crop} ({threshold}g/L)!"
                ),
                Language::En => format!(
                    "WARNING: Salinity {salinity}g/L exceeds {crop} tolerance ({threshold}g/L)!"
                ),
                Language::Ko => format!(
                    "경고: 염도 {salinity}g/L이 {crop} 내성({threshold}g/L)을 초과!"
                ),
            },
            solutions: match lang {
                Language::Vi => vec![
                    "NGỪNG lấy nước từ nguồn nhiễm mặn".to_owned(),
                    "Xả nước mặn và thay nước ngọt".to_owned(),
                    "Bón vôi gấp đôi liều thông thường".to_owned(),
                    "Xem xét chuyển đổi giống chịu mặn".to_owned(),
                    "Liên hệ cơ quan nông nghiệp địa phương".to_owned(),
                ],
                Language::En => vec![
                    "STOP taking water from saline sources".to_owned(),
                    "Drain saline water and replace with freshwater".to_owned(),
                    "Apply double lime dose".to_owned(),
                    "Consider salt-tolerant varieties".to_owned(),
                    "Contact local agricultural agency".to_owned(),
                ],
                Language::Ko => vec![
                    "염분 수원에서 취수 중단".to_owned(),
                    "염수 배수 후 담수로 교체".to_owned(),
                    "석회 용량 두 배 적용".to_owned(),
                    "내염성 품종 고려".to_owned(),
                    "지역 농업 기관에 연락".to_owned(),
                ],
            },
            policy: Some(match lang {
                Language::Vi => {
                    "Bạn có thể được hỗ trợ thiệt hại theo Nghị định 02/2017/NĐ-CP.".to_owned()
                }
                Language::En => {
                    "You may be eligible for damage support under Decree 02/2017/ND-CP.".to_owned()
                }
                Language::Ko => "법령 02/2017/ND-CP에 따른 피해 지원을 받을 수 있습니다.".to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(salinity: f64, threshold: f64, language: Language) -> DiagnosisRequest {
        DiagnosisRequest {
            province: "Ben Tre".to_owned(),
            district: None,
            crop_type: "rice".to_owned(),
            crop_label: "Rice".to_owned(),
            salinity_level: salinity,
            threshold,
            symptoms: None,
            image_urls: None,
            language,
        }
    }

    #[test]
    fn test_should_report_safe_at_half_threshold() {
        let advisory = rule_based_advisory(&request(2.0, 4.0, Language::En));
        assert_eq!(advisory.status, AdvisoryStatus::Safe);
        assert!(advisory.policy.is_none());
    }

    #[test]
    fn test_should_report_warning_above_half_threshold() {
        let advisory = rule_based_advisory(&request(2.1, 4.0, Language::En));
        assert_eq!(advisory.status, AdvisoryStatus::Warning);
        assert!(advisory.policy.is_some());
    }

    #[test]
    fn test_should_report_warning_at_exact_threshold() {
        let advisory = rule_based_advisory(&request(4.0, 4.0, Language::En));
        assert_eq!(advisory.status, AdvisoryStatus::Warning);
    }

    #[test]
    fn test_should_report_danger_above_threshold() {
        let advisory = rule_based_advisory(&request(4.1, 4.0, Language::En));
        assert_eq!(advisory.status, AdvisoryStatus::Danger);
        assert!(advisory.message.contains("WARNING"));
        assert_eq!(advisory.solutions.len(), 5);
    }

    #[test]
    fn test_should_treat_zero_threshold_as_danger_when_saline() {
        let advisory = rule_based_advisory(&request(1.0, 0.0, Language::En));
        assert_eq!(advisory.status, AdvisoryStatus::Danger);

        let advisory = rule_based_advisory(&request(0.0, 0.0, Language::En));
        assert_eq!(advisory.status, AdvisoryStatus::Safe);
    }

    #[test]
    fn test_should_localize_message_per_language() {
        let vi = rule_based_advisory(&request(4.1, 4.0, Language::Vi));
        assert!(vi.message.contains("CẢNH BÁO"));

        let ko = rule_based_advisory(&request(4.1, 4.0, Language::Ko));
        assert!(ko.message.contains("경고"));
    }

    #[test]
    fn test_should_serialize_status_lowercase() {
        let advisory = rule_based_advisory(&request(1.0, 4.0, Language::En));
        let json = serde_json::to_string(&advisory).expect("serializable");
        assert!(json.contains("\"status\":\"safe\""));
    }
}

//! Static BIAN service-domain catalog and keyword-based recommendations.
//!
//! The catalog is a fixed lookup table. Each domain and API carries a list of
//! keyword stems (Spanish and English); a stem matches at the start of a word,
//! so `pago` matches both "pago" and "pagos".

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{API_SELECTION_THRESHOLD, DOMAIN_SELECTION_THRESHOLD};

/// A BIAN service domain
#[derive(Debug, Clone, Serialize)]
pub struct BianDomain {
    pub id: &'static str,
    pub name: &'static str,
    pub business_area: &'static str,
    pub description: &'static str,
    #[serde(skip)]
    pub keywords: &'static [&'static str],
}

/// A service operation API exposed by a domain
#[derive(Debug, Clone, Serialize)]
pub struct BianApi {
    pub id: &'static str,
    pub domain_id: &'static str,
    pub name: &'static str,
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
    #[serde(skip)]
    pub keywords: &'static [&'static str],
}

/// Scored domain candidate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct DomainRecommendation {
    pub domain_id: String,
    pub name: String,
    /// Normalized score in [0, 1]
    pub confidence: f64,
    pub matched_keywords: Vec<String>,
    /// Whether the candidate passes the pre-selection threshold
    pub selected: bool,
}

/// Scored API candidate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ApiRecommendation {
    pub api_id: String,
    pub domain_id: String,
    pub name: String,
    pub confidence: f64,
    pub matched_keywords: Vec<String>,
    pub selected: bool,
}

static DOMAINS: &[BianDomain] = &[
    BianDomain {
        id: "payment-order",
        name: "Payment Order",
        business_area: "Operations & Execution",
        description: "Handles the processing of payment instructions from customers.",
        keywords: &["pago", "payment", "transferencia", "transfer", "orden de pago", "remesa", "beneficiario"],
    },
    BianDomain {
        id: "payment-execution",
        name: "Payment Execution",
        business_area: "Operations & Execution",
        description: "Executes payment transactions through clearing and settlement channels.",
        keywords: &["liquidación", "liquidacion", "settlement", "clearing", "compensación", "compensacion", "swift", "spei"],
    },
    BianDomain {
        id: "fraud-detection",
        name: "Fraud Detection",
        business_area: "Risk & Compliance",
        description: "Detects suspicious activity and evaluates transactions for fraud.",
        keywords: &["fraude", "fraud", "sospechos", "suspicious", "anomalía", "anomalia", "anomaly", "alerta"],
    },
    BianDomain {
        id: "customer-offer",
        name: "Customer Offer",
        business_area: "Sales & Service",
        description: "Orchestrates the processing of a product offer for a new or existing customer.",
        keywords: &["oferta", "offer", "originación", "originacion", "solicitud", "application", "onboarding", "alta de producto"],
    },
    BianDomain {
        id: "party-reference-data-directory",
        name: "Party Reference Data Directory",
        business_area: "Reference Data",
        description: "Maintains reference details about customers and other parties.",
        keywords: &["cliente", "customer", "kyc", "datos personales", "identificación", "identificacion", "dirección", "direccion", "party"],
    },
    BianDomain {
        id: "customer-credit-rating",
        name: "Customer Credit Rating",
        business_area: "Risk & Compliance",
        description: "Maintains and evaluates a credit rating for a customer.",
        keywords: &["scoring", "calificación", "calificacion", "credit rating", "buró", "buro", "riesgo crediticio", "solvencia"],
    },
    BianDomain {
        id: "consumer-loan",
        name: "Consumer Loan",
        business_area: "Products",
        description: "Fulfills and services consumer loan products.",
        keywords: &["préstamo", "prestamo", "loan", "crédito", "credito", "cuota", "amortización", "amortizacion", "financiamiento"],
    },
    BianDomain {
        id: "current-account",
        name: "Current Account",
        business_area: "Products",
        description: "Fulfills current account products including balances and transactions.",
        keywords: &["cuenta", "account", "saldo", "balance", "depósito", "deposito", "retiro", "movimiento"],
    },
    BianDomain {
        id: "card-authorization",
        name: "Card Authorization",
        business_area: "Operations & Execution",
        description: "Authorizes card transactions against limits and fraud rules.",
        keywords: &["tarjeta", "card", "autorización", "autorizacion", "authorization", "punto de venta", "comercio", "límite", "limite"],
    },
    BianDomain {
        id: "regulatory-compliance",
        name: "Regulatory Compliance",
        business_area: "Risk & Compliance",
        description: "Ensures adherence to regulatory requirements and reporting.",
        keywords: &["regulación", "regulacion", "regulatory", "cumplimiento", "compliance", "normativ", "reporte regulatorio", "aml", "lavado"],
    },
];

static APIS: &[BianApi] = &[
    BianApi {
        id: "payment-order-initiate",
        domain_id: "payment-order",
        name: "Initiate Payment Order",
        method: "POST",
        path: "/PaymentOrder/Initiate",
        description: "Initiate a new payment order for a customer.",
        keywords: &["iniciar", "initiate", "crear", "enviar", "send"],
    },
    BianApi {
        id: "payment-order-retrieve",
        domain_id: "payment-order",
        name: "Retrieve Payment Order",
        method: "GET",
        path: "/PaymentOrder/{cr-reference-id}/Retrieve",
        description: "Retrieve the details and status of a payment order.",
        keywords: &["consultar", "estado", "status", "retrieve", "seguimiento"],
    },
    BianApi {
        id: "payment-execution-initiate",
        domain_id: "payment-execution",
        name: "Initiate Payment Execution",
        method: "POST",
        path: "/PaymentExecution/Initiate",
        description: "Execute a payment through the selected mechanism.",
        keywords: &["ejecutar", "execute", "procesar", "process"],
    },
    BianApi {
        id: "fraud-evaluation-evaluate",
        domain_id: "fraud-detection",
        name: "Evaluate Fraud Case",
        method: "POST",
        path: "/FraudDetection/Evaluate",
        description: "Evaluate a transaction for fraud indicators.",
        keywords: &["evaluar", "evaluate", "validar", "transacción", "transaccion"],
    },
    BianApi {
        id: "fraud-detection-notify",
        domain_id: "fraud-detection",
        name: "Notify Fraud Alert",
        method: "PUT",
        path: "/FraudDetection/{cr-reference-id}/Notify",
        description: "Notify stakeholders about a suspected fraud case.",
        keywords: &["notificar", "notify", "bloquear", "block"],
    },
    BianApi {
        id: "customer-offer-initiate",
        domain_id: "customer-offer",
        name: "Initiate Customer Offer",
        method: "POST",
        path: "/CustomerOffer/Initiate",
        description: "Start the offer process for a product.",
        keywords: &["iniciar", "initiate", "solicitar", "request"],
    },
    BianApi {
        id: "customer-offer-update",
        domain_id: "customer-offer",
        name: "Update Customer Offer",
        method: "PUT",
        path: "/CustomerOffer/{cr-reference-id}/Update",
        description: "Update the details of an offer in progress.",
        keywords: &["actualizar", "update", "modificar"],
    },
    BianApi {
        id: "party-reference-retrieve",
        domain_id: "party-reference-data-directory",
        name: "Retrieve Party Reference",
        method: "GET",
        path: "/PartyReferenceDataDirectory/{cr-reference-id}/Retrieve",
        description: "Retrieve customer reference data.",
        keywords: &["consultar", "retrieve", "obtener", "buscar"],
    },
    BianApi {
        id: "party-reference-register",
        domain_id: "party-reference-data-directory",
        name: "Register Party Reference",
        method: "POST",
        path: "/PartyReferenceDataDirectory/Register",
        description: "Register a new party in the directory.",
        keywords: &["registrar", "register", "alta", "crear"],
    },
    BianApi {
        id: "credit-rating-evaluate",
        domain_id: "customer-credit-rating",
        name: "Evaluate Credit Rating",
        method: "POST",
        path: "/CustomerCreditRating/Evaluate",
        description: "Compute a credit rating for a customer.",
        keywords: &["evaluar", "evaluate", "calcular", "score"],
    },
    BianApi {
        id: "consumer-loan-initiate",
        domain_id: "consumer-loan",
        name: "Initiate Consumer Loan",
        method: "POST",
        path: "/ConsumerLoan/Initiate",
        description: "Set up a new consumer loan facility.",
        keywords: &["otorgar", "desembolso", "disbursement", "iniciar", "initiate"],
    },
    BianApi {
        id: "consumer-loan-retrieve",
        domain_id: "consumer-loan",
        name: "Retrieve Consumer Loan",
        method: "GET",
        path: "/ConsumerLoan/{cr-reference-id}/Retrieve",
        description: "Retrieve the state of a consumer loan.",
        keywords: &["consultar", "retrieve", "estado", "plan de pagos"],
    },
    BianApi {
        id: "current-account-retrieve",
        domain_id: "current-account",
        name: "Retrieve Current Account",
        method: "GET",
        path: "/CurrentAccount/{cr-reference-id}/Retrieve",
        description: "Retrieve account balances and details.",
        keywords: &["consultar", "retrieve", "saldo", "balance"],
    },
    BianApi {
        id: "current-account-execute",
        domain_id: "current-account",
        name: "Execute Account Transaction",
        method: "PUT",
        path: "/CurrentAccount/{cr-reference-id}/Execute",
        description: "Post a debit or credit against the account.",
        keywords: &["debitar", "debit", "acreditar", "abono", "cargo"],
    },
    BianApi {
        id: "card-authorization-evaluate",
        domain_id: "card-authorization",
        name: "Evaluate Card Authorization",
        method: "POST",
        path: "/CardAuthorization/Evaluate",
        description: "Authorize or decline a card transaction.",
        keywords: &["autorizar", "authorize", "aprobar", "rechazar", "decline"],
    },
    BianApi {
        id: "regulatory-compliance-evaluate",
        domain_id: "regulatory-compliance",
        name: "Evaluate Regulatory Compliance",
        method: "POST",
        path: "/RegulatoryCompliance/Evaluate",
        description: "Check an activity against applicable regulations.",
        keywords: &["verificar", "evaluar", "check", "validar"],
    },
    BianApi {
        id: "regulatory-compliance-report",
        domain_id: "regulatory-compliance",
        name: "Retrieve Compliance Report",
        method: "GET",
        path: "/RegulatoryCompliance/{cr-reference-id}/Retrieve",
        description: "Produce regulatory reporting for an activity.",
        keywords: &["reporte", "report", "informe", "auditoría", "auditoria"],
    },
];

/// Compiled stem matchers, one per keyword, keyed by catalog position
struct Matchers {
    domains: Vec<Vec<(&'static str, Regex)>>,
    apis: Vec<Vec<(&'static str, Regex)>>,
}

fn compile(keywords: &'static [&'static str]) -> Vec<(&'static str, Regex)> {
    keywords
        .iter()
        .filter_map(|kw| {
            // Keywords are static literals; escaping makes compilation infallible
            Regex::new(&format!(r"\b{}", regex::escape(kw)))
                .ok()
                .map(|re| (*kw, re))
        })
        .collect()
}

static MATCHERS: Lazy<Matchers> = Lazy::new(|| Matchers {
    domains: DOMAINS.iter().map(|d| compile(d.keywords)).collect(),
    apis: APIS.iter().map(|a| compile(a.keywords)).collect(),
});

/// All catalog domains in catalog order
pub fn domains() -> &'static [BianDomain] {
    DOMAINS
}

/// All catalog APIs in catalog order
pub fn apis() -> &'static [BianApi] {
    APIS
}

pub fn find_domain(id: &str) -> Option<&'static BianDomain> {
    DOMAINS.iter().find(|d| d.id == id)
}

pub fn find_api(id: &str) -> Option<&'static BianApi> {
    APIS.iter().find(|a| a.id == id)
}

/// APIs belonging to one domain
pub fn apis_for_domain(domain_id: &str) -> Vec<&'static BianApi> {
    APIS.iter().filter(|a| a.domain_id == domain_id).collect()
}

/// Map a number of keyword hits onto [0, 1): each hit halves the remaining distance to 1.
pub fn confidence_from_hits(hits: usize) -> f64 {
    let hits = hits.min(i32::MAX as usize) as i32;
    1.0 - 0.5f64.powi(hits)
}

/// Count keyword hits, letting each stretch of text count once.
///
/// Overlapping matches ("transfer" inside "transferencia", "pago" inside
/// "orden de pago") resolve to the longest match starting first.
fn count_hits<'a, I>(text: &str, matchers: I) -> (usize, Vec<String>)
where
    I: IntoIterator<Item = &'a (&'static str, Regex)>,
{
    let matchers: Vec<&(&'static str, Regex)> = matchers.into_iter().collect();

    let mut spans: Vec<(usize, usize, &'static str)> = matchers
        .iter()
        .flat_map(|(keyword, re)| re.find_iter(text).map(move |m| (m.start(), m.end(), *keyword)))
        .collect();
    spans.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut hits = 0;
    let mut covered_to = 0;
    let mut kept: Vec<&'static str> = Vec::new();
    for (start, end, keyword) in spans {
        if start < covered_to {
            continue;
        }
        hits += 1;
        covered_to = end;
        kept.push(keyword);
    }

    let mut matched: Vec<String> = Vec::new();
    for (keyword, _) in &matchers {
        if kept.contains(keyword) && !matched.iter().any(|m| m == keyword) {
            matched.push((*keyword).to_string());
        }
    }
    (hits, matched)
}

fn round(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Score every catalog domain against free text.
///
/// Results are ordered by confidence (descending), then by catalog order.
pub fn recommend_domains(text: &str) -> Vec<DomainRecommendation> {
    let text = text.to_lowercase();
    let mut scored: Vec<DomainRecommendation> = DOMAINS
        .iter()
        .zip(MATCHERS.domains.iter())
        .map(|(domain, matchers)| {
            let (hits, matched_keywords) = count_hits(&text, matchers.iter());
            let confidence = round(confidence_from_hits(hits));
            DomainRecommendation {
                domain_id: domain.id.to_string(),
                name: domain.name.to_string(),
                confidence,
                matched_keywords,
                selected: confidence >= DOMAIN_SELECTION_THRESHOLD,
            }
        })
        .collect();

    // stable sort keeps catalog order for ties
    scored.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    scored
}

/// Score the APIs of the given domains (every domain when `domain_ids` is empty).
///
/// An API's hits are its own keyword hits plus the hits of its domain.
pub fn recommend_apis(text: &str, domain_ids: &[String]) -> Vec<ApiRecommendation> {
    let text = text.to_lowercase();

    let mut scored: Vec<ApiRecommendation> = APIS
        .iter()
        .zip(MATCHERS.apis.iter())
        .filter(|(api, _)| domain_ids.is_empty() || domain_ids.iter().any(|d| d == api.domain_id))
        .map(|(api, matchers)| {
            let domain_matchers = DOMAINS
                .iter()
                .position(|d| d.id == api.domain_id)
                .map(|idx| MATCHERS.domains[idx].as_slice())
                .unwrap_or_default();
            let (hits, matched_keywords) = count_hits(&text, matchers.iter().chain(domain_matchers));

            let confidence = round(confidence_from_hits(hits));
            ApiRecommendation {
                api_id: api.id.to_string(),
                domain_id: api.domain_id.to_string(),
                name: api.name.to_string(),
                confidence,
                matched_keywords,
                selected: confidence >= API_SELECTION_THRESHOLD,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    scored
}

/// Domain and API recommendations for one piece of text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Recommendations {
    pub domains: Vec<DomainRecommendation>,
    pub apis: Vec<ApiRecommendation>,
}

/// Recommend domains, then APIs of `domain_ids`.
///
/// Without explicit domains, APIs are scored for the pre-selected domains,
/// or for the whole catalog when nothing passes the threshold.
pub fn recommend(text: &str, domain_ids: &[String]) -> Recommendations {
    let domains = recommend_domains(text);
    let scope: Vec<String> = if domain_ids.is_empty() {
        domains
            .iter()
            .filter(|d| d.selected)
            .map(|d| d.domain_id.clone())
            .collect()
    } else {
        domain_ids.to_vec()
    };
    let apis = recommend_apis(text, &scope);
    Recommendations { domains, apis }
}

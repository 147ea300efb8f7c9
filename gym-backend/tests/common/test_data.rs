// tests/common/test_data.rs

use gym_backend::utils::validation::cpf_check_digits;
use serde_json::{json, Value};
use uuid::Uuid;

// === 生徒関連のテストデータ ===

/// 有効な CPF を生成（乱数の 9 桁 + 検証桁）
pub fn generate_cpf() -> String {
    let seed = Uuid::new_v4().as_u128();
    let mut base = [0u32; 9];
    for (i, digit) in base.iter_mut().enumerate() {
        *digit = ((seed >> (i * 7)) % 10) as u32;
    }
    // 全桁同じ CPF は無効扱いなので崩す
    if base.iter().all(|d| *d == base[0]) {
        base[8] = (base[0] + 1) % 10;
    }
    let (first, second) = cpf_check_digits(&base);
    base.iter()
        .chain([first, second].iter())
        .map(|d| char::from(b'0' + *d as u8))
        .collect()
}

/// 一意なメールアドレス
pub fn unique_email(prefix: &str) -> String {
    format!("{}.{}@example.com", prefix, &Uuid::new_v4().simple().to_string()[..8])
}

/// 生徒の入力データ
pub fn student_payload(nome: &str, cpf: &str, forma_pagamento: &str) -> Value {
    json!({
        "nome_aluno": nome,
        "email_aluno": unique_email("aluno"),
        "telefone_aluno": "(11) 98765-4321",
        "cpf_aluno": cpf,
        "plano_aluno": "mensal",
        "forma_pagamento": forma_pagamento,
    })
}

/// カード入学のリクエスト（末尾 0002 は開発ゲートウェイで拒否される）
pub fn card_enrollment(nome: &str, cpf: &str, numero: &str) -> Value {
    let mut payload = student_payload(nome, cpf, "credito");
    payload["dados_cartao"] = json!({
        "nome_titular": nome.to_uppercase(),
        "numero": numero,
        "mes_validade": "12",
        "ano_validade": "2035",
        "cvv": "123",
    });
    payload
}

pub const APPROVED_CARD: &str = "4111111111111111";
pub const DECLINED_CARD: &str = "4111111111110002";

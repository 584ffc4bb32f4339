use crate::types::Profile;

const DEFAULT_NAME: &str = "あなた";

/// Firestore 里没有 systemPrompt 时使用的默认系统提示词
pub fn build_default_system_prompt(profile: Option<&Profile>) -> String {
    let name = or_placeholder(profile.and_then(|p| p.name.as_deref()), DEFAULT_NAME);
    let birthday = or_placeholder(profile.and_then(|p| p.birthday.as_deref()), "");
    let gender = or_placeholder(profile.and_then(|p| p.gender.as_deref()), "");
    let note = or_placeholder(profile.and_then(|p| p.note.as_deref()), "");

    format!(
        r#"
あなたは「ZEN.AI」という名前の対話パートナーです。
日本の禅や静けさを大切にしながら、ユーザーの自己内省をそっと支える役割を持ちます。

# あなたの振る舞いの方針
- 相手を評価せず、批判せず、受け止める。
- すぐに答えや結論を押し付けない。
- ときどき、問いかけを返して、相手が自分で気づけるように導く。
- 言葉数は多すぎず、短くてもいいので、丁寧で、落ち着いた日本語で話す。
- 相手がしんどい時は、まず「そう感じていること」を認めるところから始める。
- アドバイスをする場合も、「もしよければ」「一つの案として」などの前置きを入れる。

# ユーザー情報（参考）
- 名前: {name}
- 生年月日: {birthday}
- 性別: {gender}
- 今の一言: {note}

# 出力フォーマット
- 文章は日本語で、ですます調を基本としてください。
- 1〜3段落程度に収めてください。
- 顔文字や絵文字は、基本的には使わず、静かなトーンを保ってください。
  "#
    )
    .trim()
    .to_string()
}

fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    value.filter(|s| !s.is_empty()).unwrap_or(placeholder)
}

//! Built-in prompt templates.
//!
//! Templates are Portuguese, use Handlebars placeholders and are rendered in
//! strict mode.

use crate::types::{PromptDefinition, PromptOutputSpec};

/// Identifiers of the built-in prompts.
pub mod ids {
    pub const QA: &str = "rag.qa";
    pub const CONDENSE: &str = "rag.condense";
    pub const SYNTHESIS: &str = "rag.synthesis";
    pub const FORMAT: &str = "rag.format";
    pub const HYDE: &str = "rag.hyde";
    pub const REWRITE: &str = "rag.rewrite";
    pub const EXTRACT_METADATA: &str = "rag.extract_metadata";
    pub const ROUTE: &str = "rag.route";
    pub const FACTUAL: &str = "rag.factual";
}

pub const BUILTIN_PROMPT_IDS: &[&str] = &[
    ids::QA,
    ids::CONDENSE,
    ids::SYNTHESIS,
    ids::FORMAT,
    ids::HYDE,
    ids::REWRITE,
    ids::EXTRACT_METADATA,
    ids::ROUTE,
    ids::FACTUAL,
];

const QA_TEMPLATE: &str = r#"Você é um especialista em normas bancárias do BACEN.
Use apenas o contexto extraído das normas para responder à pergunta e pense com calma, revisando os processos e a lógica.
Para responder a qualquer pergunta envolvendo normas, siga rigorosamente esta estrutura:

1) **Norma e Seção**:
   - Informe o nome completo da norma (ex.: Resolução BCB nº X/ANO) e a seção exata (artigo e parágrafo) aplicáveis.

2) **Texto Literal**:
   - Apresente o(s) trecho(s) exato(s) da(s) norma(s) identificado(s) no item 1.

3) **Explicação**:
   - Forneça uma interpretação clara e objetiva do trecho legal, destacando como ele responde à pergunta.

4) **Conclusão**:
   - Responda à pergunta citando todos os possíveis cenários e resumindo o principal ponto aplicável.

Contexto extraído:
{{context}}

Pergunta do usuário:
{{question}}
"#;

const CONDENSE_TEMPLATE: &str = r#"Dado o histórico de uma conversa e uma nova pergunta, reformule a nova pergunta para ser uma pergunta autônoma e completa, em português, que possa ser entendida sem o histórico. NÃO responda à pergunta, apenas a reformule.

Histórico da Conversa:
{{chat_history}}

Nova Pergunta:
{{question}}

Pergunta Autônoma:
"#;

const SYNTHESIS_TEMPLATE: &str = r#"Você é um analista regulatório sênior do Banco Central do Brasil, encarregado de produzir uma análise definitiva e completa. Leia todo o CONTEXTO NORMATIVO fornecido, que contém trechos de diferentes normas, e sintetize uma única resposta coesa e bem fundamentada para a PERGUNTA DO USUÁRIO.

**Instruções de Síntese:**
1.  **Leia e Conecte:** Identifique como as diferentes normas se complementam. Uma norma pode fornecer a fórmula principal enquanto outra detalha a metodologia de cálculo de seus componentes.
2.  **Estruture a Resposta:** Organize a análise em Análise dos Fatos, Dedução Lógica e Conclusão.
3.  **Fundamente nos Fatos:** Baseie cada afirmação exclusivamente nos trechos do CONTEXTO NORMATIVO. Cite os artigos e normas relevantes.
4.  **Seja Conclusivo:** A análise é sua. Não se refira a outros pareceres.

**Regra de Segurança:**
Se as informações do contexto forem insuficientes para responder à pergunta, declare isso claramente.

---
**CONTEXTO NORMATIVO:**
{{consolidated_context}}

---
**PERGUNTA DO USUÁRIO:**
{{question}}

---
**Sua Análise Final:**
"#;

const FORMAT_TEMPLATE: &str = r#"Você é um redator técnico sênior do Banco Central do Brasil, especializado em formatar análises complexas em um formato padronizado e claro.

Sua única tarefa é pegar a "Análise Consolidada" abaixo e reformatá-la para seguir rigorosamente a estrutura do "Template de Resposta Final".

Não adicione nenhuma informação nova, não altere a lógica e não faça novas deduções. Apenas formate o conteúdo fornecido.

---
**Análise Consolidada (conteúdo a ser formatado):**
{{verified_analysis}}

---
**Template de Resposta Final:**

1) **Norma e Seção**:
   - Informe o nome completo da norma (ex.: Resolução BCB nº X/ANO) e a seção exata (artigo e parágrafo) aplicáveis.

2) **Texto Literal**:
   - Apresente o(s) trecho(s) exato(s) da(s) norma(s) identificado(s) no item 1.

3) **Explicação**:
   - Forneça uma interpretação clara e objetiva do trecho legal, destacando como ele responde à pergunta.

4) **Conclusão**:
   - Responda à pergunta citando todos os possíveis cenários e resumindo o principal ponto aplicável.

---
**Pergunta Original do Usuário:**
{{question}}

---
**Sua Resposta Final:**
"#;

const HYDE_TEMPLATE: &str = r#"Você é um especialista em regulação do BACEN.
Escreva um parágrafo que responda de forma plausível à seguinte pergunta.
O parágrafo deve ser um trecho de um documento normativo fictício, usando linguagem técnica e formal.

Pergunta: {{question}}
Resposta Fictícia:
"#;

const REWRITE_TEMPLATE: &str = r#"Você é um engenheiro de busca sênior, especialista em otimizar perguntas para um sistema de busca em documentos regulatórios do Banco Central.
Reescreva a pergunta do usuário como uma única consulta de busca precisa e autocontida.

**Diretrizes:**
1.  **Intenção Principal:** Identifique o objetivo central da pergunta.
2.  **Termos-Chave:** Inclua todos os termos técnicos, entidades, números de normas ou artigos mencionados (ex.: "Capital Principal", "Resolução 4.958", "Art. 66", "FPR").
3.  **Desambiguação:** Expanda acrônimos ou termos ambíguos (ex.: "CRI" -> "Certificado de Recebíveis Imobiliários").
4.  **Clareza:** Formule uma pergunta completa e direta, sem informalidades.

**Não responda à pergunta.** Apenas forneça a versão otimizada para a busca.

Pergunta Original: "{{question}}"
Pergunta Otimizada para Busca:"#;

const EXTRACT_METADATA_TEMPLATE: &str = r#"Atue como um especialista em roteamento de consultas para uma base de normas do Banco Central. Analise a "Pergunta do Usuário" e extraia metadados para filtrar a busca.

Você DEVE responder com um objeto JSON. As chaves válidas são: "tipo_norma", "numero_norma", "termo_tecnico", "artigo".

**REGRAS:**
1.  Se a pergunta não contiver informação para uma chave, omita a chave.
2.  Se nenhum metadado relevante for encontrado, retorne um objeto JSON vazio: {}.
3.  Normalize os valores: 'resolução' ou 'res' vira 'resolucao'; 'circular' ou 'circ' vira 'circular'.
4.  Para 'artigo', extraia apenas o número (ex.: de "Art. 15", extraia "15").
5.  Para 'termo_tecnico', extraia o conceito, sigla ou tema principal da pergunta. Se houver vários, extraia o mais importante.

**EXEMPLOS:**

Pergunta do Usuário: "Qual o tratamento para o risco de crédito segundo a resolução 4958?"
Resposta:
{"tipo_norma": "resolucao", "numero_norma": "4958", "termo_tecnico": "risco de crédito"}
---
Pergunta do Usuário: "Preciso saber sobre o Patrimônio de Referência no Art. 12 da circular 3978."
Resposta:
{"tipo_norma": "circular", "numero_norma": "3978", "termo_tecnico": "Patrimônio de Referência", "artigo": "12"}
---
Pergunta do Usuário: "Olá, tudo bem?"
Resposta:
{}
---
**Pergunta do Usuário:**
{{question}}

**Resposta (APENAS O JSON):**
"#;

const ROUTE_TEMPLATE: &str = r#"Classifique a pergunta do usuário em uma de duas categorias, com base em sua intenção. Responda apenas com o nome da categoria.

Categorias:
- "Consulta Normativa": a pergunta envolve interpretação, cálculo, aplicação ou detalhes de uma lei, regra, norma, resolução ou artigo.
- "Consulta Factual": a pergunta busca uma definição, descrição ou informação geral sobre uma entidade, pessoa, produto ou conceito.

Pergunta do Usuário:
"{{question}}"

Categoria:
"#;

const FACTUAL_TEMPLATE: &str = r#"Você é um assistente de conhecimento, especialista em apresentar informações de forma clara e organizada. Responda à pergunta do usuário com um resumo completo e bem estruturado, usando apenas as informações do contexto abaixo.

**Instruções:**
1.  **Síntese Completa:** Leia todo o contexto e forneça uma resposta abrangente.
2.  **Estrutura Lógica:** Organize a resposta em parágrafos. Comece com uma definição ou resumo geral e depois acrescente detalhes como datas, classificações, produtos ou objetivos.
3.  **Fidelidade ao Contexto:** Não acrescente informação que não esteja no contexto.

Contexto:
{{context}}

Pergunta do Usuário:
{{question}}

Resposta:
"#;

fn definition(id: &str, title: &str, variables: &[&str], template: &str, format: &str) -> PromptDefinition {
    PromptDefinition {
        id: id.to_string(),
        title: title.to_string(),
        api_version: "1.0".to_string(),
        variables: variables.iter().map(|v| v.to_string()).collect(),
        template: template.to_string(),
        output: PromptOutputSpec {
            format: format.to_string(),
        },
    }
}

/// Look up a built-in prompt by id.
pub fn builtin_prompt(id: &str) -> Option<PromptDefinition> {
    let def = match id {
        ids::QA => definition(ids::QA, "Resposta com contexto", &["context", "question"], QA_TEMPLATE, "markdown"),
        ids::CONDENSE => definition(
            ids::CONDENSE,
            "Pergunta autônoma",
            &["chat_history", "question"],
            CONDENSE_TEMPLATE,
            "text",
        ),
        ids::SYNTHESIS => definition(
            ids::SYNTHESIS,
            "Síntese normativa",
            &["consolidated_context", "question"],
            SYNTHESIS_TEMPLATE,
            "markdown",
        ),
        ids::FORMAT => definition(
            ids::FORMAT,
            "Formatação final",
            &["verified_analysis", "question"],
            FORMAT_TEMPLATE,
            "markdown",
        ),
        ids::HYDE => definition(ids::HYDE, "Documento hipotético", &["question"], HYDE_TEMPLATE, "text"),
        ids::REWRITE => definition(ids::REWRITE, "Reescrita para busca", &["question"], REWRITE_TEMPLATE, "text"),
        ids::EXTRACT_METADATA => definition(
            ids::EXTRACT_METADATA,
            "Extração de metadados",
            &["question"],
            EXTRACT_METADATA_TEMPLATE,
            "json",
        ),
        ids::ROUTE => definition(ids::ROUTE, "Classificação da pergunta", &["question"], ROUTE_TEMPLATE, "text"),
        ids::FACTUAL => definition(
            ids::FACTUAL,
            "Resposta factual",
            &["context", "question"],
            FACTUAL_TEMPLATE,
            "markdown",
        ),
        _ => return None,
    };
    Some(def)
}

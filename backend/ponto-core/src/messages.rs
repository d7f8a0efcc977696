// src/messages.rs

// User-facing texts returned in response bodies (pt-BR).

pub const UNEXPECTED_FAILURE: &str = "Falha inesperada, tente novamente mais tarde";

pub mod punch {
    pub const MISSING_PARAMETER: &str = "O parâmetro \"momento\" é obrigatório";
    pub const INVALID_FORMAT: &str =
        "O parâmetro \"momento\" precisa ser uma data válida no formato YYYY-MM-DDTHH:mm:ss";
    pub const WEEKEND_NOT_ALLOWED: &str = "Sábado e domingo não são permitidos como dia de trabalho";
    pub const OUT_OF_ORDER: &str =
        "O horário precisa ser maior do que os que já foram informados anteriormente para este dia";
    pub const DUPLICATE: &str = "Horário já registrado";
    pub const MAX_PUNCHES: &str = "Apenas 4 horários podem ser registrados por dia";
    pub const LUNCH_TOO_SHORT: &str = "Deve haver no mínimo 1 hora de almoço";
    pub const CONCURRENT_UPDATE: &str =
        "O registro deste dia foi alterado por outra requisição, tente novamente";
}

pub mod report {
    pub const INVALID_MONTH: &str =
        "O parâmetro \"mes\" precisa estar no formato YYYY-MM";
    pub const FAILED_TO_BUILD: &str = "Falha ao gerar a folha de ponto";
}

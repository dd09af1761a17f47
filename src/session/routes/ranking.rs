//! Ranking calls: per-category leaderboards, the player common-data
//! store, and the tournament competition scoring

use crate::database::entities::{CommonData, RankingScore, Tournament, TournamentScore};
use crate::services::counters::keys;
use crate::session::models::errors::{RendezvousError, ServerResult};
use crate::session::models::ranking::{
    ranking_mode, CommonDataResponse, CompetitionGetScoreRequest, CompetitionInfo,
    CompetitionInfoRequest, CompetitionScoreData, CompetitionScoreInfo,
    CompetitionUploadScoreRequest, GetCommonDataRequest, GetRankingRequest, RankingScoreData,
    UploadCommonDataRequest, UploadScoreRequest,
};
use crate::session::models::to_wire_datetime;
use crate::session::packet::Rmc;
use crate::session::SessionLink;
use crate::utils::parsing::common_data::CommonData as ParsedCommonData;
use log::debug;

/// Upper bound on competition season lookback
const MAX_SEASON_RANGE: u32 = 5;
/// Upper bound on competition info pages
const MAX_INFO_RANGE: u32 = 100;
/// Upper bound on leaderboard pages
const MAX_RANKING_RANGE: u32 = 100;
/// Upper bound on competition score metadata
const MAX_SCORE_METADATA: usize = 0x100;

pub async fn handle_upload_score(
    session: SessionLink,
    request: UploadScoreRequest,
) -> ServerResult<()> {
    let pid = session.require_pid()?;
    RankingScore::upsert(
        &session.app.db,
        request.category,
        pid,
        request.score,
        request.groups,
        request.param as i64,
    )
    .await?;
    Ok(())
}

pub async fn handle_upload_common_data(
    session: SessionLink,
    request: UploadCommonDataRequest,
) -> ServerResult<()> {
    let pid = session.require_pid()?;

    let parsed = ParsedCommonData::parse(&request.data)
        .map_err(|_| RendezvousError::InvalidDataSize)?;
    CommonData::upsert(
        &session.app.db,
        pid,
        request.data,
        request.unique_id as i64,
        parsed,
    )
    .await?;

    debug!("Stored common data (PID: {pid})");
    Ok(())
}

pub async fn handle_get_common_data(
    session: SessionLink,
    GetCommonDataRequest { pid }: GetCommonDataRequest,
) -> ServerResult<Rmc<CommonDataResponse>> {
    session.require_pid()?;
    let data = CommonData::by_pid(&session.app.db, pid)
        .await?
        .ok_or(RendezvousError::InvalidIndex)?;
    Ok(Rmc(CommonDataResponse { data: data.data }))
}

pub async fn handle_get_ranking(
    session: SessionLink,
    request: GetRankingRequest,
) -> ServerResult<Rmc<Vec<RankingScoreData>>> {
    let own_pid = session.require_pid()?;
    let app = &session.app;

    if request.range.size > MAX_RANKING_RANGE {
        return Err(RendezvousError::InvalidArgument);
    }

    let entries = match request.mode {
        ranking_mode::RANGE => {
            let rows = RankingScore::get_range(
                &app.db,
                request.category,
                request.range.offset as u64,
                request.range.size as u64,
            )
            .await?;
            rows.into_iter()
                .enumerate()
                .map(|(index, row)| to_score_data(row, request.range.offset as u64 + index as u64))
                .collect()
        }
        ranking_mode::SELF => {
            let target = if request.pid != 0 { request.pid } else { own_pid };
            match RankingScore::get_entry(&app.db, request.category, target).await? {
                Some(row) => {
                    let rank = RankingScore::rank_of(&app.db, &row).await?;
                    vec![to_score_data(row, rank - 1)]
                }
                None => Vec::new(),
            }
        }
        ranking_mode::FRIENDS => {
            let target = if request.pid != 0 { request.pid } else { own_pid };
            let mut pids = app.accounts.friend_pids(target).await?;
            pids.push(target);
            let rows = RankingScore::get_for_pids(&app.db, request.category, pids).await?;
            rows.into_iter()
                .enumerate()
                .map(|(index, row)| to_score_data(row, index as u64))
                .collect()
        }
        _ => return Err(RendezvousError::InvalidArgument),
    };

    Ok(Rmc(entries))
}

fn to_score_data(row: RankingScore, zero_based_rank: u64) -> RankingScoreData {
    RankingScoreData {
        rank: zero_based_rank as u32 + 1,
        pid: row.pid,
        category: row.category,
        score: row.score,
        groups: row.groups,
        param: row.param as u64,
        last_update: to_wire_datetime(row.last_update),
    }
}

pub async fn handle_get_competition_ranking_score(
    session: SessionLink,
    CompetitionGetScoreRequest { id, range }: CompetitionGetScoreRequest,
) -> ServerResult<Rmc<Vec<CompetitionScoreInfo>>> {
    session.require_pid()?;
    let app = &session.app;

    if range.size > MAX_SEASON_RANGE {
        return Err(RendezvousError::InvalidArgument);
    }

    let tournament = Tournament::by_id(&app.db, id)
        .await?
        .ok_or(RendezvousError::InvalidArgument)?;

    // The most recent `size` seasons ending at the current one
    let season_cur = tournament.season_id;
    let season_min = season_cur
        .saturating_add(1)
        .saturating_sub(range.size)
        .max(1);

    let mut infos = Vec::new();
    for season_id in season_min..=season_cur {
        let rows = TournamentScore::top_for_season(&app.db, id, season_id).await?;

        // Team totals are only materialised for team tournaments. The
        // score counters accumulate score + 1 per participant, so the
        // participation counts are subtracted back out.
        let mut team_scores = [0u32; 4];
        if tournament.is_team_tournament() {
            team_scores[2] = app
                .counters
                .get_u32(&keys::participation_season_team(id, season_id, 0))
                .await?;
            team_scores[3] = app
                .counters
                .get_u32(&keys::participation_season_team(id, season_id, 1))
                .await?;
            team_scores[0] = (app
                .counters
                .get(&keys::scores_season_team(id, season_id, 0))
                .await?
                .max(0) as u32)
                .saturating_sub(team_scores[2]);
            team_scores[1] = (app
                .counters
                .get(&keys::scores_season_team(id, season_id, 1))
                .await?
                .max(0) as u32)
                .saturating_sub(team_scores[3]);
        }

        let num_participants = app
            .counters
            .get_u32(&keys::participation_season_total(id, season_id))
            .await?;

        let scores = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| CompetitionScoreData {
                rank: index as u32 + 1,
                pid: row.pid,
                score: row.score,
                team_id: row.team_id,
                metadata: row.metadata,
                last_update: to_wire_datetime(row.last_update),
            })
            .collect();

        infos.push(CompetitionScoreInfo {
            season_id,
            num_participants,
            team_scores,
            scores,
        });
    }

    Ok(Rmc(infos))
}

pub async fn handle_upload_competition_ranking_score(
    session: SessionLink,
    request: CompetitionUploadScoreRequest,
) -> ServerResult<Rmc<bool>> {
    let pid = session.require_pid()?;
    let app = &session.app;

    if request.metadata.len() > MAX_SCORE_METADATA {
        return Err(RendezvousError::InvalidArgument);
    }

    let tournament = Tournament::by_id(&app.db, request.id)
        .await?
        .ok_or(RendezvousError::InvalidArgument)?;

    let old_score =
        TournamentScore::find_by_key(&app.db, request.id, request.season_id, pid).await?;
    let first_upload = old_score.is_none();

    // The team score counters accumulate score + 1 per participant so
    // that reads can subtract the participation counters back out
    let mut diff = request.score as i64;
    if let Some(old) = &old_score {
        diff -= old.score as i64;
    } else {
        diff += 1;
    }

    TournamentScore::upsert(
        &app.db,
        request.id,
        request.season_id,
        pid,
        request.score,
        request.team_id,
        request.team_score,
        request.metadata,
    )
    .await?;

    if first_upload {
        // First upload for this key: bump the participation counters
        Tournament::increment_participants(&app.db, request.id).await?;
        app.counters
            .incr(&keys::participation_total(request.id), 1)
            .await?;
        app.counters
            .incr(
                &keys::participation_season_total(request.id, request.season_id),
                1,
            )
            .await?;

        if request.team_id <= 1 {
            app.counters
                .incr(&keys::participation_team(request.id, request.team_id), 1)
                .await?;
            app.counters
                .incr(
                    &keys::participation_season_team(
                        request.id,
                        request.season_id,
                        request.team_id,
                    ),
                    1,
                )
                .await?;
        }

        if request.season_id > tournament.season_id {
            Tournament::advance_season(&app.db, request.id, request.season_id).await?;
        }
    }

    if request.team_id <= 1 {
        app.counters
            .incr(&keys::scores_team(request.id, request.team_id), diff)
            .await?;
        app.counters
            .incr(
                &keys::scores_season_team(request.id, request.season_id, request.team_id),
                diff,
            )
            .await?;
    }

    debug!(
        "Uploaded competition score (ID: {}, season: {}, PID: {pid})",
        request.id, request.season_id
    );
    Ok(Rmc(true))
}

pub async fn handle_get_competition_info(
    session: SessionLink,
    request: CompetitionInfoRequest,
) -> ServerResult<Rmc<Vec<CompetitionInfo>>> {
    let CompetitionInfoRequest { range } = request;
    session.require_pid()?;
    let app = &session.app;

    if range.size > MAX_INFO_RANGE {
        return Err(RendezvousError::InvalidArgument);
    }

    // Public, non-hidden tournaments ordered by popularity
    let tournaments: Vec<Tournament> = Tournament::by_popularity(&app.db)
        .await?
        .into_iter()
        .filter(|row| row.attribute(0) == 1 && row.attribute(12) != 2 && row.attribute(13) != 2)
        .skip(range.offset as usize)
        .take(range.size as usize)
        .collect();

    let mut infos = Vec::new();
    for tournament in tournaments {
        let id = tournament.id;
        let mut team_scores = [0u32; 4];
        if tournament.is_team_tournament() {
            team_scores[2] = app.counters.get_u32(&keys::participation_team(id, 0)).await?;
            team_scores[3] = app.counters.get_u32(&keys::participation_team(id, 1)).await?;
            team_scores[0] = (app.counters.get(&keys::scores_team(id, 0)).await?.max(0) as u32)
                .saturating_sub(team_scores[2]);
            team_scores[1] = (app.counters.get(&keys::scores_team(id, 1)).await?.max(0) as u32)
                .saturating_sub(team_scores[3]);
        }

        infos.push(CompetitionInfo {
            id,
            num_participants: app.counters.get_u32(&keys::participation_total(id)).await?,
            team_scores,
        });
    }

    Ok(Rmc(infos))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::database::entities::Tournament;
    use crate::services::{test_app, tournaments::valid_attributes, App};
    use crate::session::models::ranking::CompetitionUploadScoreRequest;
    use crate::session::models::tournaments::SimpleSearchDateTimeAttribute;
    use crate::session::models::ResultRange;
    use crate::session::{Session, SessionLink};
    use crate::utils::parsing::tournament_meta::{sample_metadata, TournamentMetadata};
    use std::sync::Arc;

    const TOURNAMENT: u32 = 20001;

    /// Registered session for the provided principal
    fn player(app: &Arc<App>, pid: u32) -> SessionLink {
        let session = Session::test(app.clone());
        session.set_auth(pid);
        session
    }

    /// Seeds a team tournament directly into storage
    async fn seed_team_tournament(app: &Arc<App>) {
        let metadata = sample_metadata();
        let parsed = TournamentMetadata::parse(&metadata).unwrap();
        let mut attributes = valid_attributes();
        attributes[4] = 2;

        Tournament::create(
            &app.db,
            TOURNAMENT,
            1,
            55,
            "123456789012".to_string(),
            attributes,
            metadata,
            &parsed,
            SimpleSearchDateTimeAttribute::default(),
        )
        .await
        .unwrap();
    }

    fn upload(id: u32, season_id: u32, score: u32, team_id: u32) -> CompetitionUploadScoreRequest {
        CompetitionUploadScoreRequest {
            id,
            season_id,
            score,
            team_id,
            team_score: 0,
            metadata: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_team_scoring_scenario() {
        let app = test_app().await;
        seed_team_tournament(&app).await;

        let player_a = player(&app, 100);
        let player_b = player(&app, 200);

        handle_upload_competition_ranking_score(player_a.clone(), upload(TOURNAMENT, 1, 10, 0))
            .await
            .unwrap();
        handle_upload_competition_ranking_score(player_b.clone(), upload(TOURNAMENT, 1, 15, 1))
            .await
            .unwrap();

        let Rmc(infos) = handle_get_competition_ranking_score(
            player_a.clone(),
            CompetitionGetScoreRequest {
                id: TOURNAMENT,
                range: ResultRange { offset: 0, size: 1 },
            },
        )
        .await
        .unwrap();

        assert_eq!(infos.len(), 1);
        let season = &infos[0];
        assert_eq!(season.season_id, 1);
        assert_eq!(season.num_participants, 2);
        assert_eq!(season.team_scores, [10, 15, 1, 1]);

        assert_eq!(season.scores.len(), 2);
        assert_eq!(season.scores[0].rank, 1);
        assert_eq!(season.scores[0].pid, 200);
        assert_eq!(season.scores[0].score, 15);
        assert_eq!(season.scores[1].rank, 2);
        assert_eq!(season.scores[1].pid, 100);
        assert_eq!(season.scores[1].score, 10);

        let tournament = Tournament::by_id(&app.db, TOURNAMENT).await.unwrap().unwrap();
        assert_eq!(tournament.total_participants, 2);

        // Re-upload replaces the row and adjusts the team total by
        // the score difference
        handle_upload_competition_ranking_score(player_a.clone(), upload(TOURNAMENT, 1, 20, 0))
            .await
            .unwrap();

        let Rmc(infos) = handle_get_competition_ranking_score(
            player_a.clone(),
            CompetitionGetScoreRequest {
                id: TOURNAMENT,
                range: ResultRange { offset: 0, size: 1 },
            },
        )
        .await
        .unwrap();

        let season = &infos[0];
        assert_eq!(season.num_participants, 2);
        assert_eq!(season.team_scores, [20, 15, 1, 1]);
        assert_eq!(season.scores[0].pid, 100);
        assert_eq!(season.scores[0].score, 20);
        assert_eq!(season.scores[1].pid, 200);

        // Participation is unchanged by the replacement
        let tournament = Tournament::by_id(&app.db, TOURNAMENT).await.unwrap().unwrap();
        assert_eq!(tournament.total_participants, 2);
    }

    #[tokio::test]
    async fn test_upload_advances_season() {
        let app = test_app().await;
        seed_team_tournament(&app).await;

        let player_a = player(&app, 100);
        handle_upload_competition_ranking_score(player_a.clone(), upload(TOURNAMENT, 3, 5, 0))
            .await
            .unwrap();

        let tournament = Tournament::by_id(&app.db, TOURNAMENT).await.unwrap().unwrap();
        assert_eq!(tournament.season_id, 3);

        // Older seasons never move it backwards
        let player_b = player(&app, 200);
        handle_upload_competition_ranking_score(player_b.clone(), upload(TOURNAMENT, 2, 5, 1))
            .await
            .unwrap();
        let tournament = Tournament::by_id(&app.db, TOURNAMENT).await.unwrap().unwrap();
        assert_eq!(tournament.season_id, 3);
    }

    #[tokio::test]
    async fn test_upload_validation() {
        let app = test_app().await;
        seed_team_tournament(&app).await;
        let player_a = player(&app, 100);

        // Oversized metadata
        let mut request = upload(TOURNAMENT, 1, 5, 0);
        request.metadata = vec![0; 0x101];
        assert_eq!(
            handle_upload_competition_ranking_score(player_a.clone(), request)
                .await
                .unwrap_err(),
            RendezvousError::InvalidArgument
        );

        // Unknown tournament
        assert_eq!(
            handle_upload_competition_ranking_score(player_a.clone(), upload(999, 1, 5, 0))
                .await
                .unwrap_err(),
            RendezvousError::InvalidArgument
        );

        // Season lookback above the cap
        assert_eq!(
            handle_get_competition_ranking_score(
                player_a.clone(),
                CompetitionGetScoreRequest {
                    id: TOURNAMENT,
                    range: ResultRange { offset: 0, size: 6 },
                },
            )
            .await
            .unwrap_err(),
            RendezvousError::InvalidArgument
        );
    }

    #[tokio::test]
    async fn test_competition_info_listing() {
        let app = test_app().await;
        seed_team_tournament(&app).await;

        let player_a = player(&app, 100);
        handle_upload_competition_ranking_score(player_a.clone(), upload(TOURNAMENT, 1, 10, 0))
            .await
            .unwrap();

        let Rmc(infos) = handle_get_competition_info(
            player_a.clone(),
            CompetitionInfoRequest {
                range: ResultRange { offset: 0, size: 10 },
            },
        )
        .await
        .unwrap();

        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].id, TOURNAMENT);
        assert_eq!(infos[0].num_participants, 1);
        assert_eq!(infos[0].team_scores, [10, 0, 1, 0]);
    }

    #[tokio::test]
    async fn test_category_ranking_orders_ascending() {
        let app = test_app().await;

        let player_a = player(&app, 100);
        let player_b = player(&app, 200);

        handle_upload_score(
            player_a.clone(),
            UploadScoreRequest {
                category: 7,
                score: 90,
                groups: Vec::new(),
                param: 0,
            },
        )
        .await
        .unwrap();
        handle_upload_score(
            player_b.clone(),
            UploadScoreRequest {
                category: 7,
                score: 80,
                groups: Vec::new(),
                param: 0,
            },
        )
        .await
        .unwrap();

        let Rmc(entries) = handle_get_ranking(
            player_a.clone(),
            GetRankingRequest {
                category: 7,
                mode: ranking_mode::RANGE,
                range: ResultRange { offset: 0, size: 10 },
                pid: 0,
            },
        )
        .await
        .unwrap();

        // Lower score ranks first
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].pid, 200);
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[1].pid, 100);
        assert_eq!(entries[1].rank, 2);

        let Rmc(entries) = handle_get_ranking(
            player_a.clone(),
            GetRankingRequest {
                category: 7,
                mode: ranking_mode::SELF,
                range: ResultRange { offset: 0, size: 1 },
                pid: 0,
            },
        )
        .await
        .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pid, 100);
        assert_eq!(entries[0].rank, 2);
    }

    #[tokio::test]
    async fn test_common_data_round_trip() {
        let app = test_app().await;
        let player_a = player(&app, 100);

        let mut blob = vec![0u8; 0xD4];
        blob[0x0C..0x10].copy_from_slice(&1.5f32.to_be_bytes());
        blob[0x84] = 1;

        handle_upload_common_data(
            player_a.clone(),
            UploadCommonDataRequest {
                data: blob.clone(),
                unique_id: 9,
            },
        )
        .await
        .unwrap();

        let Rmc(response) = handle_get_common_data(
            player_a.clone(),
            GetCommonDataRequest { pid: 100 },
        )
        .await
        .unwrap();
        assert_eq!(response.data, blob);

        // Wrong sized blobs are rejected
        assert_eq!(
            handle_upload_common_data(
                player_a.clone(),
                UploadCommonDataRequest {
                    data: vec![0; 0xD3],
                    unique_id: 9,
                },
            )
            .await
            .unwrap_err(),
            RendezvousError::InvalidDataSize
        );
    }
}

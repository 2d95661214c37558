use super::exception;
use super::structs::{
    CatchmentStructureData, CharacterVector, MarshaledDateTime as Dt, MarshaledTsGeometry as Geom,
    MultiStatisticDefinition, NamedValuesVector, OptimizerLogData, SceParameters, StringStringMap,
};
use crate::config::BindingConfig;
use crate::error::{Result, SwiftError};
use libloading::Library;
use once_cell::sync::OnceCell;
use std::os::raw::{c_char, c_double, c_int, c_void};
type Ptr = *mut c_void;
type Str = *const c_char;
type Strs = *mut *mut c_char;
type OwnedStr = *mut c_char;
// One line per C entry point: `field = "Symbol": fn(args) -> ret;`
macro_rules! native_api {
    ($($field:ident = $sym:literal : fn($($arg:ty),*) $(-> $ret:ty)?;)+) => {
        pub(crate) struct SwiftApi {
            #[allow(dead_code)]
            lib: Library,
            $(pub(crate) $field: unsafe extern "C" fn($($arg),*) $(-> $ret)?,)+
        }
        impl SwiftApi {
            // Safety: signatures transcribed from the SWIFT C header.
            unsafe fn bind(lib: Library) -> std::result::Result<Self, libloading::Error> {
                Ok(Self {
                    $($field: *lib.get(concat!($sym, "\0").as_bytes())?,)+
                    lib,
                })
            }
        }
    };
}
native_api! {
    get_last_std_exception_message = "GetLastStdExceptionMessage": fn() -> OwnedStr;
    register_exception_callback = "RegisterExceptionCallback": fn(*const c_void);
    dispose_shared_pointer = "DisposeSharedPointer": fn(Ptr);
    delete_ansi_string_array = "DeleteAnsiStringArray": fn(Strs, c_int);
    delete_ansi_string = "DeleteAnsiString": fn(Str);
    dispose_named_values_vector = "DisposeNamedValuedVectorsSwift": fn(*mut NamedValuesVector);
    dispose_string_string_map = "DisposeStringStringMapSwift": fn(*mut StringStringMap);

    // system
    get_runoff_model_identifiers = "GetRunoffModelIdentifiers": fn(*mut c_int) -> Strs;
    get_runoff_model_var_identifiers = "GetRunoffModelVarIdentifiers": fn(Str, *mut c_int) -> Strs;
    set_default_max_threads = "SetDefaultMaxThreadsWila": fn(c_int);
    get_default_max_threads = "GetDefaultMaxThreadsWila": fn() -> c_int;
    get_known_parameterization_strategies = "GetKnownParameterizationStrategies": fn(*mut c_int) -> Strs;
    get_known_aggregation_strategies = "GetKnownParameterizerAggregationStrategies": fn(*mut c_int) -> Strs;
    get_known_target_selector_types = "GetKnownParameterizationTargetSelectorTypes": fn(*mut c_int) -> Strs;
    get_num_model_runners = "GetNumModelRunners": fn() -> c_int;
    get_num_catchments = "GetNumCatchments": fn() -> c_int;
    get_num_rainfall_runoff = "GetNumRainfallRunoff": fn() -> c_int;
    get_num_hyper_cubes = "GetNumHyperCubes": fn() -> c_int;
    get_num_hyper_cubes_wila = "GetNumHyperCubesWila": fn() -> c_int;
    get_num_state_initializers = "GetNumStateInitializers": fn() -> c_int;
    set_log_likelihood_variable_names = "SetLogLikelihoodVariableNames":
        fn(Str, Str, Str, Str, Str, Str, Str);
    set_log_likelihood_x_variable_names = "SetLogLikelihoodXVariableNames":
        fn(Str, Str, Str, Str, Str, Str, Str, Str, Str);
    set_log_likelihood_mixture_variable_names = "SetLogLikelihoodMixtureVariableNames":
        fn(Str, Str, Str, Str, Str, Str, Str, Str, Str);

    // simulation
    clone_model = "CloneModel": fn(Ptr) -> Ptr;
    subset_model = "SubsetModel": fn(Ptr, Str, bool, bool, bool, Strs, c_int) -> Ptr;
    sort_simulation_elements_by_run_order = "SortSimulationElementsByRunOrder":
        fn(Ptr, Strs, c_int, Str, *mut c_int) -> Strs;
    swap_runoff_model = "SwapRunoffModel": fn(Ptr, Str) -> Ptr;
    set_channel_routing_model = "SetChannelRoutingModel": fn(Ptr, Str);
    set_error_correction_model = "SetErrorCorrectionModel": fn(Ptr, Str, Str, c_int, c_int);
    set_seed_for_model = "SetSeedForModel": fn(Ptr, Str, c_int);
    set_reservoir_model = "SetReservoirModel": fn(Ptr, Str, Str);
    set_runoff_post_processing_model = "SetRunoffPostProcessingModel": fn(Ptr, Str, Str);
    set_reservoir_geometry = "SetReservoirGeometry":
        fn(Ptr, Str, c_int, *mut c_double, *mut c_double, *mut c_double);
    set_reservoir_min_discharge = "SetReservoirMinDischarge":
        fn(Ptr, Str, c_int, *mut c_double, *mut c_double);
    set_reservoir_max_discharge = "SetReservoirMaxDischarge":
        fn(Ptr, Str, c_int, *mut c_double, *mut c_double);
    set_reservoir_ops_release_curve = "SetReservoirOpsReleaseCurve":
        fn(Ptr, Str, c_int, *mut c_double, *mut c_double);
    remove_storage_discharge_relationship = "RemoveStorageDischargeRelationship": fn(Ptr, Str, Str);
    set_subarea_inputs_preprocessor_model = "SetSubareaInputsPreprocessorModel": fn(Ptr, Str, Str);
    wire_subarea_inputs_preprocessor_model = "WireSubareaInputsPreprocessorModel":
        fn(Ptr, Str, Str, Str);
    remove_model = "RemoveModel": fn(Ptr, Str);
    create_catchment = "CreateCatchment":
        fn(c_int, Strs, Strs, c_int, Strs, Strs, Strs, Strs, Str, *mut c_double) -> Ptr;
    get_catchment_structure = "GetCatchmentStructure": fn(Ptr) -> *mut CatchmentStructureData;
    dispose_catchment_structure = "DisposeCatchmentStructure": fn(*mut CatchmentStructureData);
    play = "Play": fn(Ptr, Str, *mut c_double, *mut Geom);
    record = "Record": fn(Ptr, Str);
    remove_played_time_series = "RemovePlayedTimeSeries": fn(Ptr, Str);
    remove_recorder = "RemoveRecorder": fn(Ptr, Str);
    set_span = "SetSpan": fn(Ptr, Dt, Dt);
    create_subarea = "CreateSubarea": fn(Str, c_double) -> Ptr;
    execute_simulation = "ExecuteSimulation": fn(Ptr, bool);
    reset_model_states = "ResetModelStates": fn(Ptr);
    check_simulation_errors = "CheckSimulationErrors": fn(Ptr, *mut c_int) -> Strs;
    get_start = "GetStart": fn(Ptr, *mut Dt);
    get_end = "GetEnd": fn(Ptr, *mut Dt);
    set_time_step = "SetTimeStep": fn(Ptr, Str);
    get_time_step_name = "GetTimeStepName": fn(Ptr) -> OwnedStr;
    get_num_steps = "GetNumSteps": fn(Ptr) -> c_int;
    get_num_steps_for_time_span = "GetNumStepsForTimeSpan": fn(Ptr, Dt, Dt) -> c_int;
    get_played = "GetPlayed": fn(Ptr, Str, *mut c_double, c_int);
    get_played_ts_geometry = "GetPlayedTsGeometry": fn(Ptr, Str, *mut Geom);
    get_recorded = "GetRecorded": fn(Ptr, Str, *mut c_double, c_int);
    get_recorded_ts_geometry = "GetRecordedTsGeometry": fn(Ptr, Str, *mut Geom);
    get_num_recorded_variables = "GetNumRecordedVariables": fn(Ptr) -> c_int;
    get_num_played_variables = "GetNumPlayedVariables": fn(Ptr) -> c_int;
    get_num_links = "GetNumLinks": fn(Ptr) -> c_int;
    get_num_nodes = "GetNumNodes": fn(Ptr) -> c_int;
    get_num_subareas = "GetNumSubareas": fn(Ptr) -> c_int;
    is_valid_variable_identifier = "IsValidVariableIdentifier": fn(Ptr, Str) -> bool;
    get_catchment_dot_graph = "GetCatchmentDOTGraph": fn(Ptr) -> OwnedStr;
    get_played_variable_names = "GetPlayedVariableNames": fn(Ptr, *mut c_int) -> Strs;
    get_recorded_variable_names = "GetRecordedVariableNames": fn(Ptr, *mut c_int) -> Strs;
    get_subarea_names = "GetSubareaNames": fn(Ptr, *mut c_int) -> Strs;
    get_link_names = "GetLinkNames": fn(Ptr, *mut c_int) -> Strs;
    get_node_names = "GetNodeNames": fn(Ptr, *mut c_int) -> Strs;
    get_subarea_identifiers = "GetSubareaIdentifiers": fn(Ptr, *mut c_int) -> Strs;
    get_link_identifiers = "GetLinkIdentifiers": fn(Ptr, *mut c_int) -> Strs;
    get_node_identifiers = "GetNodeIdentifiers": fn(Ptr, *mut c_int) -> Strs;
    get_element_var_identifiers = "GetElementVarIdentifiers": fn(Ptr, Str, *mut c_int) -> Strs;
    set_variable = "SetVariable": fn(Ptr, Str, c_double);
    set_variable_int = "SetVariableInt": fn(Ptr, Str, c_int);
    set_variable_bool = "SetVariableBool": fn(Ptr, Str, bool);
    get_variable = "GetVariable": fn(Ptr, Str) -> c_double;
    get_variable_int = "GetVariableInt": fn(Ptr, Str) -> c_int;
    get_variable_bool = "GetVariableBool": fn(Ptr, Str) -> bool;
    get_model_configuration = "GetModelConfigurationSwift": fn(Ptr, Str) -> *mut StringStringMap;
    variable_is_int = "VariableIsInt": fn(Ptr, Str) -> bool;
    variable_is_bool = "VariableIsBool": fn(Ptr, Str) -> bool;
    save_model_simulation_to_json = "SaveModelSimulationToJson": fn(Ptr, Str);
    load_model_simulation_from_json = "LoadModelSimulationFromJson": fn(Str) -> Ptr;

    // parameterisers
    apply_configuration = "ApplyConfiguration": fn(Ptr, Ptr);
    supports_thread_safe_cloning = "SupportsThreadSafeCloning": fn(Ptr) -> bool;
    clone_hypercube_parameterizer = "CloneHypercubeParameterizer": fn(Ptr) -> Ptr;
    create_hypercube_parameterizer = "CreateHypercubeParameterizer": fn(Str) -> Ptr;
    create_subcatchment_hypercube_parameterizer = "CreateSubcatchmentHypercubeParameterizer":
        fn(Ptr, Ptr) -> Ptr;
    untransform_hypercube_parameterizer = "UntransformHypercubeParameterizer": fn(Ptr) -> Ptr;
    homothetic_transform = "HomotheticTransform": fn(Ptr, Ptr, c_double) -> Ptr;
    aggregate_parameterizers = "AggregateParameterizers": fn(Str, *mut Ptr, c_int) -> Ptr;
    tag_parameterizer = "TagParameterizer": fn(Ptr, Str);
    create_composite_parameterizer = "CreateCompositeParameterizer": fn() -> Ptr;
    create_functions_parameterizer = "CreateFunctionsParameterizer": fn(Ptr, Ptr) -> Ptr;
    create_filtering_parameterizer = "CreateFilteringParameterizer": fn(Ptr) -> Ptr;
    hide_parameters = "HideParameters": fn(Ptr, *mut CharacterVector, bool, bool, bool);
    show_parameters = "ShowParameters": fn(Ptr, *mut CharacterVector, bool, bool);
    create_prefixing_parameterizer = "CreatePrefixingParameterizer": fn(Ptr, Str) -> Ptr;
    add_to_composite_parameterizer = "AddToCompositeParameterizer": fn(Ptr, Ptr);
    create_gr4_scaled_parameterizer = "CreateGr4ScaledParameterizer": fn(c_double, c_int) -> Ptr;
    create_state_init_parameterizer = "CreateStateInitParameterizer": fn(Ptr) -> Ptr;
    create_transform_parameterizer = "CreateTransformParameterizer": fn(Ptr) -> Ptr;
    create_muskingum_constraint = "CreateMuskingumConstraint":
        fn(Ptr, c_double, Str, Str, Ptr) -> Ptr;
    get_feasible_muskingum_bounds = "GetFeasibleMuskingumBounds":
        fn(Ptr, c_double) -> *mut NamedValuesVector;
    create_target_scaling_parameterizer = "CreateTargetScalingParameterizer": fn(Str) -> Ptr;
    create_sqrt_area_ratio_parameterizer = "CreateSqrtAreaRatioParameterizer":
        fn(c_double, Str, Str, c_double, c_double, c_double) -> Ptr;
    get_parameter_min_value = "GetParameterMinValue": fn(Ptr, Str) -> c_double;
    get_parameter_max_value = "GetParameterMaxValue": fn(Ptr, Str) -> c_double;
    get_parameter_value = "GetParameterValue": fn(Ptr, Str) -> c_double;
    get_num_parameters = "GetNumParameters": fn(Ptr) -> c_int;
    get_parameter_name = "GetParameterName": fn(Ptr, c_int) -> OwnedStr;
    is_within_bounds = "IsWithinBounds": fn(Ptr) -> bool;
    set_parameter_value = "SetParameterValue": fn(Ptr, Str, c_double);
    set_max_parameter_value = "SetMaxParameterValue": fn(Ptr, Str, c_double);
    set_min_parameter_value = "SetMinParameterValue": fn(Ptr, Str, c_double);
    add_parameter_definition = "AddParameterDefinition":
        fn(Ptr, Str, c_double, c_double, c_double);
    set_parameter_definition = "SetParameterDefinition":
        fn(Ptr, Str, c_double, c_double, c_double);
    set_default_parameters = "SetDefaultParameters": fn(Ptr, Str);
    add_linear_scaling_parameterizer = "AddLinearScalingParameterizer":
        fn(Ptr, Str, Str, Str, c_double, c_double, c_double, c_double);
    add_parameter_transform = "AddParameterTransform":
        fn(Ptr, Str, Str, Str, c_double, c_double);
    save_parameterizer = "SaveParameterizer": fn(Ptr, Str);
    load_parameterizer = "LoadParameterizer": fn(Str) -> Ptr;

    // objectives and scores
    create_single_observation_objective_evaluator_wila =
        "CreateSingleObservationObjectiveEvaluatorWila":
        fn(Ptr, Str, *mut c_double, *mut Geom, Str) -> Ptr;
    create_empty_composite_objective_evaluator = "CreateEmptyCompositeObjectiveEvaluator": fn() -> Ptr;
    add_single_observation_objective_evaluator = "AddSingleObservationObjectiveEvaluator":
        fn(Ptr, Ptr, c_double, Str);
    create_composite_observation_objective_evaluator =
        "CreateCompositeObservationObjectiveEvaluator":
        fn(Ptr, Str, *mut c_double, *mut Geom, Str) -> Ptr;
    create_multisite_objective_evaluator = "CreateMultisiteObjectiveEvaluator":
        fn(Ptr, *mut MultiStatisticDefinition, *mut NamedValuesVector) -> Ptr;
    clone_objective_evaluator = "CloneObjectiveEvaluator": fn(Ptr, Ptr) -> Ptr;
    wrap_objective_evaluator_wila = "WrapObjectiveEvaluatorWila": fn(Ptr, bool) -> Ptr;
    unwrap_objective_evaluator_wila = "UnwrapObjectiveEvaluatorWila": fn(Ptr) -> Ptr;
    evaluate_score = "EvaluateScore": fn(Ptr) -> c_double;
    evaluate_score_for_parameters = "EvaluateScoreForParameters": fn(Ptr, Ptr) -> c_double;
    evaluate_score_for_parameters_init_state = "EvaluateScoreForParametersInitState":
        fn(Ptr, Ptr) -> c_double;
    evaluate_scores_for_parameters_wila = "EvaluateScoresForParametersWila":
        fn(Ptr, Ptr) -> *mut NamedValuesVector;
    evaluate_score_for_parameters_wila = "EvaluateScoreForParametersWila": fn(Ptr, Ptr) -> Ptr;
    evaluate_score_for_parameters_wila_init_state = "EvaluateScoreForParametersWilaInitState":
        fn(Ptr, Ptr) -> Ptr;
    get_name_objective_evaluator = "GetNameObjectiveEvaluator": fn(Ptr) -> OwnedStr;
    objective_evaluator_is_maximizable = "ObjectiveEvaluatorIsMaximizable": fn(Ptr) -> bool;
    get_scores_at_index = "GetScoresAtIndex": fn(Ptr, c_int) -> Ptr;
    sort_set_of_scores_by = "SortSetOfScoresBy": fn(Ptr, Str) -> Ptr;
    get_system_configuration_wila = "GetSystemConfigurationWila": fn(Ptr) -> Ptr;
    get_num_scores_wila = "GetNumScoresWila": fn(Ptr) -> c_int;
    get_score_wila = "GetScoreWila": fn(Ptr, c_int) -> c_double;
    get_score_name_wila = "GetScoreNameWila": fn(Ptr, c_int) -> OwnedStr;
    get_length_set_of_scores = "GetLengthSetOfScores": fn(Ptr) -> c_int;

    // optimisation
    create_shuffled_complex_evolution_wila = "CreateShuffledComplexEvolutionWila":
        fn(Ptr, Ptr, SceParameters, Ptr) -> Ptr;
    create_optimizer_wila = "CreateOptimizerWila": fn(Ptr, Ptr, *mut StringStringMap) -> Ptr;
    create_sce_marginal_termination_wila = "CreateSceMarginalTerminationWila":
        fn(c_double, c_int, c_double) -> Ptr;
    create_sce_max_runtime_termination_wila = "CreateSceMaxRuntimeTerminationWila":
        fn(c_double) -> Ptr;
    create_sce_max_iteration_termination_wila = "CreateSceMaxIterationTerminationWila":
        fn(c_int) -> Ptr;
    create_sce_termination_wila = "CreateSceTerminationWila": fn(Str, Strs, c_int) -> Ptr;
    create_candidate_factory_seed_wila = "CreateCandidateFactorySeedWila": fn(Ptr, Str, c_int) -> Ptr;
    execute_optimizer_wila = "ExecuteOptimizerWila": fn(Ptr) -> Ptr;
    set_max_threads_optimizer_wila = "SetMaxThreadsOptimizerWila": fn(Ptr, c_int);
    get_optimizer_log_data_wila = "GetOptimizerLogDataWila": fn(Ptr) -> *mut OptimizerLogData;
    dispose_optimizer_log_data_wila = "DisposeOptimizerLogDataWila": fn(*mut OptimizerLogData);
    set_optimizer_logger_wila = "SetOptimizerLoggerWila": fn(Ptr, Str);

    // ERRIS
    estimate_erris_parameters = "EstimateERRISParameters":
        fn(Ptr, *mut c_double, *mut Geom, Str, Dt, Dt, bool, Dt, Dt, c_double, c_double,
           Dt, Dt, bool, Ptr, Ptr, Ptr, bool, bool) -> Ptr;
    create_erris_parameter_estimator = "CreateERRISParameterEstimator":
        fn(Ptr, *mut c_double, *mut Geom, Str, Dt, Dt, c_double, c_double, Ptr, bool, bool) -> Ptr;
    set_erris_hydrologic_parameter_space = "SetERRISHydrologicParameterSpace": fn(Ptr, Ptr);
    set_erris_error_correction_parameter_space = "SetERRISErrorCorrectionParameterSpace":
        fn(Ptr, Ptr);
    set_erris_estimation_period = "SetERRISEstimationPeriod": fn(Ptr, Dt, Dt);
    set_erris_warmup_period = "SetERRISWarmupPeriod": fn(Ptr, Dt, Dt);
    set_erris_exclusion_period = "SetERRISExclusionPeriod": fn(Ptr, Dt, Dt);
    remove_erris_warmup_period = "RemoveERRISWarmupPeriod": fn(Ptr);
    remove_erris_exclusion_period = "RemoveERRISExclusionPeriod": fn(Ptr);
    set_erris_max_observation = "SetERRISMaxObservation": fn(Ptr, c_double);
    set_erris_cens_options = "SetERRISCensOptions": fn(Ptr, c_double);
    set_erris_verbose_calibration = "SetERRISVerboseCalibration": fn(Ptr, bool);
    calibrate_erris_stage_one = "CalibrateERRISStageOne": fn(Ptr) -> Ptr;
    calibrate_erris_stage_two = "CalibrateERRISStageTwo": fn(Ptr, Ptr) -> Ptr;
    calibrate_erris_stage_three = "CalibrateERRISStageThree": fn(Ptr, Ptr) -> Ptr;
    calibrate_erris_stage_four = "CalibrateERRISStageFour": fn(Ptr, Ptr, bool) -> Ptr;
    calibrate_erris_stage_three_ms = "CalibrateERRISStageThreeMS": fn(Ptr, Ptr) -> Ptr;
    concatenate_erris_stages_parameters = "ConcatenateERRISStagesParameters":
        fn(Ptr, Ptr, Ptr, Ptr, Ptr, Ptr, Ptr, bool) -> Ptr;
    get_erris_calibration_log = "GetERRISCalibrationLog": fn(Ptr) -> *mut OptimizerLogData;
    prepare_erris_forecasting = "PrepareERRISForecasting":
        fn(Ptr, *mut c_double, *mut Geom, Str, Dt, Dt) -> Ptr;

    // MAERRIS
    estimate_maerris_parameters = "EstimateMAERRISParameters":
        fn(Ptr, *mut c_double, *mut Geom, Str, Dt, Dt, bool, Dt, Dt, c_double, c_double,
           c_double, Dt, Dt, bool, Ptr, Ptr, Ptr, bool) -> Ptr;
    create_maerris_parameter_estimator = "CreateMAERRISParameterEstimator":
        fn(Ptr, *mut c_double, *mut Geom, Str, Dt, Dt, c_double, c_double, c_double, Ptr, bool)
            -> Ptr;
    set_maerris_hydrologic_parameter_space = "SetMAERRISHydrologicParameterSpace": fn(Ptr, Ptr);
    set_maerris_error_correction_parameter_space = "SetMAERRISErrorCorrectionParameterSpace":
        fn(Ptr, Ptr);
    set_maerris_estimation_period = "SetMAERRISEstimationPeriod": fn(Ptr, Dt, Dt);
    set_maerris_warmup_period = "SetMAERRISWarmupPeriod": fn(Ptr, Dt, Dt);
    set_maerris_exclusion_period = "SetMAERRISExclusionPeriod": fn(Ptr, Dt, Dt);
    remove_maerris_warmup_period = "RemoveMAERRISWarmupPeriod": fn(Ptr);
    remove_maerris_exclusion_period = "RemoveMAERRISExclusionPeriod": fn(Ptr);
    set_maerris_s2_window = "SetMAERRISS2Window": fn(Ptr, c_double);
    set_maerris_max_observation = "SetMAERRISMaxObservation": fn(Ptr, c_double);
    set_maerris_restriction_on = "SetMAERRISRestrictionOn": fn(Ptr, bool);
    set_maerris_cens_options = "SetMAERRISCensOptions": fn(Ptr, c_double);
    set_maerris_verbose_calibration = "SetMAERRISVerboseCalibration": fn(Ptr, bool);
    calibrate_maerris_stage_one = "CalibrateMAERRISStageOne": fn(Ptr) -> Ptr;
    calibrate_maerris_stage_two = "CalibrateMAERRISStageTwo": fn(Ptr, Ptr) -> Ptr;
    calibrate_maerris_stage_three = "CalibrateMAERRISStageThree": fn(Ptr, Ptr) -> Ptr;
    calibrate_maerris_stage_four = "CalibrateMAERRISStageFour": fn(Ptr, Ptr, bool) -> Ptr;
    calibrate_maerris_stage_three_ms = "CalibrateMAERRISStageThreeMS": fn(Ptr, Ptr) -> Ptr;
    concatenate_maerris_stages_parameters = "ConcatenateMAERRISStagesParameters":
        fn(Ptr, Ptr, Ptr, Ptr, Ptr, Ptr, Ptr, bool) -> Ptr;
    get_maerris_calibration_log = "GetMAERRISCalibrationLog": fn(Ptr) -> *mut OptimizerLogData;

    // dual pass and transformation estimation
    estimate_dual_pass_parameters = "EstimateDualPassParameters":
        fn(Ptr, *mut c_double, *mut Geom, Str, Dt, Dt, bool, Dt, Dt, c_int, c_int, c_int, bool,
           OwnedStr, Dt, Dt, bool, Ptr) -> Ptr;
    prepare_dual_pass_forecasting = "PrepareDualPassForecasting":
        fn(Ptr, *mut c_double, *mut Geom, Str, Dt, Dt, c_double) -> Ptr;
    estimate_transformation_parameters = "EstimateTransformationParameters":
        fn(*mut c_double, *mut Geom, Dt, Dt, c_double, c_double, Dt, Dt, bool, Ptr) -> Ptr;
    estimate_transformation_parameters_ms = "EstimateTransformationParametersMS":
        fn(*mut c_double, *mut Geom, Dt, Dt, Dt, Dt, bool, Ptr, Ptr) -> Ptr;

    // ensembles
    create_ensemble_model_runner = "CreateEnsembleModelRunner": fn(Ptr, c_int) -> Ptr;
    prepare_ensemble_model_runner = "PrepareEnsembleModelRunner":
        fn(Ptr, Dt, Dt, *mut c_double, *mut Geom, Str) -> Ptr;
    setup_ensemble_model_runner = "SetupEnsembleModelRunner": fn(Ptr, Dt, c_int, c_int);
    record_ensemble_model_runner = "RecordEnsembleModelRunner": fn(Ptr, Str);
    create_ensemble_forecast_simulation = "CreateEnsembleForecastSimulation":
        fn(Ptr, Dt, c_int, c_int, c_int, c_int) -> Ptr;
    execute_ensemble_forecast_simulation = "ExecuteEnsembleForecastSimulation": fn(Ptr);
    get_ensemble_forecast_single_recorded = "GetEnsembleForecastSingleRecorded":
        fn(Ptr, Str, c_int, c_int, *mut c_double);
    get_ensemble_forecast_ensemble_recorded = "GetEnsembleForecastEnsembleRecorded":
        fn(Ptr, Str, c_int, *mut *mut c_double);
    get_ensemble_forecast_lead_length = "GetEnsembleForecastLeadLength": fn(Ptr) -> c_int;
    get_ensemble_forecast_ensemble_size = "GetEnsembleForecastEnsembleSize": fn(Ptr) -> c_int;
    record_ensemble_forecast_time_series = "RecordEnsembleForecastTimeSeries": fn(Ptr, Str);

    // states
    create_state_initializer = "CreateStateInitializer": fn(Str) -> Ptr;
    clone_state_initializer = "CloneStateInitializer": fn(Ptr) -> Ptr;
    is_dictionary_state_initializer = "IsDictionaryStateInitializer": fn(Ptr) -> bool;
    get_value_state_initializer = "GetValueStateInitializer": fn(Ptr, Str) -> c_double;
    set_value_state_initializer = "SetValueStateInitializer": fn(Ptr, Str, c_double);
    use_state_initializer_model_runner = "UseStateInitializerModelRunner": fn(Ptr, Ptr);
    remove_state_initializer_model_runner = "RemoveStateInitializerModelRunner": fn(Ptr);
    add_state_initializer_model_runner = "AddStateInitializerModelRunner": fn(Ptr, Ptr);
    snapshot_memory_states = "SnapshotMemoryStates": fn(Ptr) -> Ptr;
    apply_memory_states = "ApplyMemoryStates": fn(Ptr, Ptr);
    set_memory_states = "SetMemoryStates": fn(Ptr, Ptr);
    clear_memory_states = "ClearMemoryStates": fn(Ptr);
    save_memory_states_to_file = "SaveMemoryStatesToFile": fn(Ptr, Str, Str);
    load_memory_states_from_file = "LoadMemoryStatesFromFile": fn(Str, Str) -> Ptr;
    get_memory_states = "GetMemoryStates": fn(Ptr) -> OwnedStr;
    memory_states_from_string = "MemoryStatesFromString": fn(Str) -> Ptr;
}
static API: OnceCell<SwiftApi> = OnceCell::new();
impl SwiftApi {
    fn load(config: &BindingConfig) -> Result<Self> {
        let lib = open_library(config)?;
        let name = config.library_file_name();
        let api = unsafe { Self::bind(lib) }.map_err(|source| SwiftError::LibraryLoad {
            name: name.to_string_lossy().into_owned(),
            source,
        })?;
        // Safety: the callback is a plain `extern "C" fn(const char*)` living for the whole process.
        unsafe {
            (api.register_exception_callback)(
                exception::on_native_exception as extern "C" fn(*const c_char) as *const c_void,
            )
        };
        log::debug!("loaded {} and registered the exception callback", name.to_string_lossy());
        Ok(api)
    }
    /// Shared instance, loading with the environment configuration on first use.
    pub(crate) fn instance() -> Result<&'static SwiftApi> {
        API.get_or_try_init(|| Self::load(&BindingConfig::from_env()))
    }
    pub(crate) fn initialise(config: &BindingConfig) -> Result<&'static SwiftApi> {
        if API.get().is_some() {
            log::warn!("native library already loaded; ignoring library location in the new configuration");
        }
        API.get_or_try_init(|| Self::load(config))
    }
    /// Instance if already loaded; never triggers a load (handle teardown path).
    pub(crate) fn loaded() -> Option<&'static SwiftApi> {
        API.get()
    }
}
fn open_library(config: &BindingConfig) -> Result<Library> {
    let file_name = config.library_file_name();
    for dir in &config.search_dirs {
        let candidate = dir.join(&file_name);
        if !candidate.exists() {
            continue;
        }
        match unsafe { Library::new(&candidate) } {
            Ok(lib) => return Ok(lib),
            Err(err) => log::warn!("could not load {}: {err}", candidate.display()),
        }
    }
    unsafe { Library::new(&file_name) }.map_err(|source| SwiftError::LibraryLoad {
        name: file_name.to_string_lossy().into_owned(),
        source,
    })
}
